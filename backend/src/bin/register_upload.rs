//! Uploads a local file to IPFS, optionally pins it with Storacha, and
//! records the attachment metadata on the Arkiv ledger.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use dao_ops_backend::arkiv::attachment::register_attachment;
use dao_ops_backend::arkiv::client::RpcLedger;
use dao_ops_backend::arkiv::payload::{AttachmentPayloadV1, PAYLOAD_VERSION};
use dao_ops_backend::config::Config;
use dao_ops_backend::ipfs::{FileStore, IpfsService};
use dao_ops_backend::pinning;

#[derive(Debug, Parser)]
#[command(name = "register_upload", about = "Upload a file to IPFS and record it on Arkiv")]
struct Args {
    /// Local file to upload
    file: PathBuf,

    /// Task the attachment belongs to
    #[arg(long)]
    task_id: String,

    /// MIME type of the file
    #[arg(long, default_value = "application/pdf")]
    mime_type: String,

    /// Also pin the file with the storacha CLI
    #[arg(long)]
    pin: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = Config::from_env().context("invalid configuration")?;
    let ledger = RpcLedger::new(&config.arkiv_rpc_url, &config.arkiv_private_key)?;

    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let filename = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.bin")
        .to_string();

    let ipfs = IpfsService::new(&config.ipfs_api_url);
    ipfs.initialize().await?;
    let uploaded = ipfs
        .upload_file(bytes, &filename, &args.mime_type)
        .await
        .context("IPFS upload failed")?;
    println!("Uploaded to IPFS: cid={}", uploaded.cid);

    let gateway_url = if args.pin {
        let pinned_url = pinning::pin_file(&args.file)
            .await
            .context("storacha pinning failed")?;
        println!("Pinned with storacha: {}", pinned_url);
        pinned_url
    } else {
        uploaded.gateway_url.clone()
    };

    let receipt = register_attachment(
        &ledger,
        &AttachmentPayloadV1 {
            cid: uploaded.cid,
            filename: uploaded.filename,
            mime_type: uploaded.mime_type,
            size: uploaded.size,
            task_id: args.task_id,
            gateway_url,
            space_did: config.storacha_space_did.clone(),
            uploaded_at: uploaded.uploaded_at.to_rfc3339(),
            version: PAYLOAD_VERSION,
        },
    )
    .await?;
    println!(
        "Attachment registered: key={} tx={}",
        receipt.entity_key, receipt.tx_hash
    );

    ipfs.stop().await;
    Ok(())
}
