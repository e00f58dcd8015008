use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use celebration_card::config::{
    AppConfig, Credentials, DEFAULT_ANNIVERSARY_LIST_ID, Endpoints, PathsConfig, REQUEST_TIMEOUT,
    UPLOAD_TIMEOUT, load_style, run_date,
};
use celebration_card::delivery::whatsapp::{
    CredentialReport, DEFAULT_GRAPH_BASE_URL, WhatsAppClient, WhatsAppConfig,
};
use celebration_card::people::directory::{DEFAULT_DIRECTORY_BASE_URL, PlanningCenterClient};
use celebration_card::{FontSet, RunOutcome, StyleConfig, pipeline};

const BANNER: &str = "============================================================";

#[derive(Parser, Debug)]
#[command(name = "celebration-card", version)]
struct Cli {
    /// Log at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch today's celebrations, render the postcard and send it.
    Run(RunArgs),
    /// Render a postcard offline from explicit names.
    Preview(PreviewArgs),
    /// Show which messaging credentials are configured.
    CheckCredentials(MessagingArgs),
    /// Send a plain test message, then optionally an image link.
    TestSend(TestSendArgs),
}

#[derive(Args, Debug)]
struct PathArgs {
    /// Directory holding template images.
    #[arg(long, default_value = "postcard")]
    template_dir: PathBuf,

    /// Template file name inside the template directory.
    #[arg(long, default_value = "felicidades.png")]
    template: String,

    /// Regular typeface (names and date).
    #[arg(long, default_value = "fonts/Lora-Regular.ttf")]
    font_regular: PathBuf,

    /// Bold typeface (section headers).
    #[arg(long, default_value = "fonts/Lora-Bold.ttf")]
    font_bold: PathBuf,

    /// Output image; `.jpg`/`.jpeg` writes JPEG, anything else PNG.
    #[arg(long, default_value = "combined_celebrations.jpg")]
    out: PathBuf,

    /// JSON file overriding layout style fields.
    #[arg(long)]
    style: Option<PathBuf>,
}

impl PathArgs {
    fn paths(&self) -> PathsConfig {
        PathsConfig {
            template_dir: self.template_dir.clone(),
            template_name: self.template.clone(),
            font_regular: self.font_regular.clone(),
            font_bold: self.font_bold.clone(),
            out: self.out.clone(),
        }
    }

    fn style(&self) -> anyhow::Result<StyleConfig> {
        Ok(match &self.style {
            Some(path) => load_style(path)?,
            None => StyleConfig::default(),
        })
    }

    fn fonts(&self) -> FontSet {
        FontSet::load(&self.font_regular, &self.font_bold)
    }
}

#[derive(Args, Debug)]
struct MessagingArgs {
    /// WhatsApp Business API bearer token.
    #[arg(long, env = "WHATSAPP_API_TOKEN", hide_env_values = true)]
    whatsapp_api_token: Option<String>,

    /// Sending phone-number id.
    #[arg(long, env = "WHATSAPP_PHONE_NUMBER_ID")]
    whatsapp_phone_number_id: Option<String>,

    /// Recipient number.
    #[arg(long, env = "TARGET_PHONE_NUMBER")]
    target_phone_number: Option<String>,

    /// Graph API root.
    #[arg(long, default_value = DEFAULT_GRAPH_BASE_URL)]
    graph_url: String,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Planning Center application id.
    #[arg(long, env = "PC_APP_ID", hide_env_values = true)]
    pc_app_id: Option<String>,

    /// Planning Center secret.
    #[arg(long, env = "PC_SECRET", hide_env_values = true)]
    pc_secret: Option<String>,

    #[command(flatten)]
    messaging: MessagingArgs,

    #[command(flatten)]
    paths: PathArgs,

    /// Planning Center list holding anniversary candidates.
    #[arg(long, default_value = DEFAULT_ANNIVERSARY_LIST_ID)]
    anniversary_list_id: String,

    /// Planning Center People API root.
    #[arg(long, default_value = DEFAULT_DIRECTORY_BASE_URL)]
    directory_url: String,

    /// Run as if today were this date (`YYYY-MM-DD`).
    #[arg(long)]
    date: Option<String>,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    paths: PathArgs,

    /// Birthday name; repeatable.
    #[arg(long = "birthday")]
    birthdays: Vec<String>,

    /// Anniversary entry (single or couple name); repeatable.
    #[arg(long = "anniversary")]
    anniversaries: Vec<String>,

    /// Date printed on the card (`YYYY-MM-DD`, default today).
    #[arg(long)]
    date: Option<String>,
}

#[derive(Args, Debug)]
struct TestSendArgs {
    #[command(flatten)]
    messaging: MessagingArgs,

    /// Text of the test message.
    #[arg(long, default_value = "Hello! This is a test message from the celebration postcard sender.")]
    message: String,

    /// Public https image URL to send after the text message.
    #[arg(long)]
    image_url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Preview(args) => cmd_preview(args),
        Command::CheckCredentials(args) => cmd_check_credentials(&args).map(|_| ()),
        Command::TestSend(args) => cmd_test_send(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let credentials = Credentials {
        pc_app_id: args.pc_app_id,
        pc_secret: args.pc_secret,
        whatsapp_api_token: args.messaging.whatsapp_api_token,
        whatsapp_phone_number_id: args.messaging.whatsapp_phone_number_id,
        target_phone_number: args.messaging.target_phone_number,
    };
    let endpoints = Endpoints {
        directory_base_url: args.directory_url,
        graph_base_url: args.messaging.graph_url,
        anniversary_list_id: args.anniversary_list_id,
    };
    let cfg = AppConfig::build(credentials, endpoints, args.paths.paths(), args.paths.style()?)?;
    let today = run_date(args.date.as_deref())?;

    let directory = PlanningCenterClient::new(cfg.directory.clone())?;
    let messaging = WhatsAppClient::new(cfg.messaging.clone())?;
    let mut fonts = args.paths.fonts();

    eprintln!("{BANNER}");
    eprintln!("CELEBRATION POSTCARD GENERATOR ({today})");
    eprintln!("{BANNER}");

    let outcome = pipeline::run_once(&cfg, today, &directory, &messaging, &mut fonts);
    let result = match &outcome {
        RunOutcome::Delivered {
            media_id,
            output,
            birthdays,
            anniversaries,
            truncated,
        } => {
            eprintln!(
                "sent {} ({birthdays} birthday(s), {anniversaries} anniversary(ies), media {media_id})",
                output.display()
            );
            if *truncated {
                eprintln!("warning: some names did not fit on the postcard");
            }
            Ok(())
        }
        RunOutcome::Notified { notice, sent: true } => {
            eprintln!("notification sent: {notice}");
            Ok(())
        }
        RunOutcome::Notified { notice, sent: false } => {
            Err(anyhow::anyhow!("could not deliver notification \"{notice}\""))
        }
    };

    eprintln!("{BANNER}");
    eprintln!("PROCESS COMPLETE");
    eprintln!("{BANNER}");
    result
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let today = run_date(args.date.as_deref())?;
    let paths = args.paths.paths();
    let style = args.paths.style()?;
    let mut fonts = args.paths.fonts();

    let postcard = pipeline::preview(
        &paths,
        &style,
        &mut fonts,
        &args.birthdays,
        &args.anniversaries,
        today,
    )
    .with_context(|| format!("render preview '{}'", paths.out.display()))?;

    if postcard.image.is_truncated() {
        eprintln!(
            "warning: {} line(s) did not fit on the postcard",
            postcard.image.dropped_lines
        );
    }
    eprintln!("wrote {}", postcard.path.display());
    Ok(())
}

fn cmd_check_credentials(args: &MessagingArgs) -> anyhow::Result<CredentialReport> {
    let report = CredentialReport::inspect(
        args.whatsapp_api_token.as_deref(),
        args.whatsapp_phone_number_id.as_deref(),
        args.target_phone_number.as_deref(),
    );
    eprintln!("token: {}", report.token.as_deref().unwrap_or("<not set>"));
    eprintln!(
        "phone number id: {}",
        report.phone_number_id.as_deref().unwrap_or("<not set>")
    );
    eprintln!(
        "target number: {}",
        report
            .recipient
            .as_deref()
            .map(|r| format!("+{r}"))
            .unwrap_or_else(|| "<not set>".to_owned())
    );
    let missing = report.missing();
    if !missing.is_empty() {
        anyhow::bail!("missing credentials: {}", missing.join(", "));
    }
    Ok(report)
}

fn cmd_test_send(args: TestSendArgs) -> anyhow::Result<()> {
    cmd_check_credentials(&args.messaging)?;
    let m = args.messaging;
    let client = WhatsAppClient::new(WhatsAppConfig {
        base_url: m.graph_url,
        api_token: m.whatsapp_api_token.unwrap_or_default(),
        phone_number_id: m.whatsapp_phone_number_id.unwrap_or_default(),
        recipient: m.target_phone_number.unwrap_or_default(),
        send_timeout: REQUEST_TIMEOUT,
        upload_timeout: UPLOAD_TIMEOUT,
    })?;

    let id = client
        .send_text(&args.message)
        .context("text message test failed")?;
    eprintln!("text message sent to +{} (id {id})", client.recipient_digits());

    if let Some(url) = args.image_url {
        let id = client
            .send_image_link(&url, "Test image from the celebration postcard sender")
            .context("image message test failed")?;
        eprintln!("image message sent (id {id})");
    }
    Ok(())
}
