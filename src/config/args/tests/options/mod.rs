mod timeout;
mod tracing;
mod transfer;
