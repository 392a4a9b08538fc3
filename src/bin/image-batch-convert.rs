//! Image batch conversion CLI tool
//!
//! Compresses and/or removes the background of every image in a folder
//! using the image-batch-converter library.

use image_batch_converter::cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    cli::main().await
}
