/// CPU rasterization with `vello_cpu`.
pub mod cpu;
