use serde_json::Value;
use tou_gate::render::render_sections;
use tou_gate::tou::{BlockRules, TouDocument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8001".to_string());
    let url = format!("{}/api/tou", base.trim_end_matches('/'));

    println!("Fetching {} ...", url);
    let res = reqwest::get(&url).await?;
    println!("Status: {}", res.status());

    let text = res.text().await?;
    println!("Raw Response Body: {}", text);

    let json: Value = serde_json::from_str(&text)?;
    let content = &json["data"]["content"];
    if content.is_null() {
        println!("No content in response (ok = {})", json["ok"]);
        return Ok(());
    }

    let doc: TouDocument = serde_json::from_value(content.clone())?;
    let rules = BlockRules::default();
    for section in rules.render_document(&doc) {
        println!("--- {} ---", section.title);
        for block in &section.blocks {
            println!("  {:?}", block);
        }
    }
    println!("===");
    print!("{}", render_sections(&rules.render_document(&doc), rules.bullet()));

    Ok(())
}
