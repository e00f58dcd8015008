/// JPEG/PNG output.
pub mod output;
