use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use client_core::{
    ConversionOutcome, HttpImageTransport, Node, Page, TransformController, GRAYSCALE_BUTTON_ID,
    LOADING_INDICATOR_ID, RESULT_CONTAINER_ID,
};
use reqwest::{
    header,
    multipart::{Form, Part},
    Client,
};
use shared::protocol::{self, HealthResponse, FILE_FIELD};
use url::Url;

/// Upload an image to a running server, run one grayscale conversion
/// through the transform controller, and write the result to disk.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    server_url: Url,
    #[arg(long)]
    image: PathBuf,
    /// Defaults to `<image stem>_grayscale.png` next to the input.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let http = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    let health: HealthResponse = http
        .get(endpoint(&args.server_url, protocol::health_route())?)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    println!("Server health: {} ({})", health.status, health.message);

    let filename = upload_image(&http, &args.server_url, &args.image).await?;
    println!("Uploaded as {filename}");

    // Page bootstrap: the demo owns element creation and hands the filename
    // to the controller explicitly.
    let mut page = Page::new();
    page.insert(GRAYSCALE_BUTTON_ID);
    page.insert(LOADING_INDICATOR_ID).set_hidden(true);
    let container = page.insert(RESULT_CONTAINER_ID);

    let transport = HttpImageTransport::new(args.server_url.clone());
    let controller = TransformController::bind(&page, filename, transport)?;

    match controller.handle_grayscale_conversion().await {
        ConversionOutcome::Success => {
            let children = container.children();
            let Some(Node::Image(image)) = children.first() else {
                bail!("conversion succeeded but no image was rendered");
            };
            let output = args
                .output
                .unwrap_or_else(|| default_output_path(&args.image));
            tokio::fs::write(&output, &image.source.bytes)
                .await
                .with_context(|| format!("failed to write '{}'", output.display()))?;
            println!(
                "Wrote {} ({}, {} bytes)",
                output.display(),
                image.source.content_type,
                image.source.bytes.len()
            );
            Ok(())
        }
        ConversionOutcome::ApiError | ConversionOutcome::NetworkError => {
            bail!("conversion failed: {}", container.text());
        }
        ConversionOutcome::Ignored => bail!("conversion trigger was ignored"),
    }
}

fn endpoint(base: &Url, route: &str) -> Result<Url> {
    base.join(route.trim_start_matches('/'))
        .with_context(|| format!("invalid endpoint route '{route}'"))
}

fn default_output_path(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("processed");
    image.with_file_name(format!("{stem}_grayscale.png"))
}

async fn upload_image(http: &Client, base: &Url, image: &Path) -> Result<String> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("failed to read '{}'", image.display()))?;
    let name = image
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("image path has no usable file name"))?;
    let mime = mime_guess::from_path(image).first_or_octet_stream();

    let part = Part::bytes(bytes)
        .file_name(name.to_string())
        .mime_str(mime.essence_str())?;
    let form = Form::new().part(FILE_FIELD, part);

    let response = http
        .post(endpoint(base, protocol::upload_route())?)
        .multipart(form)
        .send()
        .await?;
    if !response.status().is_redirection() {
        bail!("upload failed with status {}", response.status());
    }

    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| anyhow!("upload response carries no redirect location"))?;
    let path = location.split('?').next().unwrap_or(location);
    let filename = path
        .strip_prefix("/view/")
        .ok_or_else(|| anyhow!("unexpected upload redirect '{location}'"))?;
    if filename.is_empty() {
        bail!("upload was rejected: {location}");
    }
    Ok(filename.to_string())
}
