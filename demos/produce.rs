use std::time::Duration;

use printess_api::{Filters, PrintessClient};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let printess = PrintessClient::from_env()?;

    let template = std::env::var("PRINTESS_TEMPLATE").unwrap_or_else(|_| "poster_p".to_owned());
    let job = printess
        .production()
        .produce(
            &json!({
                "templateName": template,
                "outputSettings": { "dpi": 150 },
                "origin": "demo"
            }),
            &Filters::new(),
        )
        .await?;
    println!("job {} accepted", job.job_id);

    loop {
        let status = printess
            .production()
            .get_simple_status(&json!({ "jobId": job.job_id }), &Filters::new())
            .await?;

        if status.is_final_status {
            if status.is_error {
                anyhow::bail!("job failed: {:?}", status.error_details);
            }
            for pdf in status.pdfs {
                println!("{}: {}", pdf.document_name, pdf.url);
            }
            break;
        }

        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    Ok(())
}
