//! Bewertet JSONL-Zeilen mit Ratings aus einer Datei oder von stdin mit dem
//! mitgelieferten Modell.
//!
//! Jede Zeile ist ein Objekt mit den fünf Ratings. Ausgabe je Zeile:
//! `<confidence>\t<label>` oder `error\t<message>` für abgelehnte Zeilen,
//! auch wenn die Zeile kein gültiges JSON ist.

use airrec_core::{RawRatings, RecommendationService};
use airrec_model::LoadedModel;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
    let model_path = std::env::var("AIRREC_MODEL_PATH").map_or_else(
        |_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../models/recommendation_model.json"),
        PathBuf::from,
    );
    let service = RecommendationService::from_oracle(LoadedModel::load(&model_path)?);

    let path = std::env::args().nth(1);
    let reader: Box<dyn BufRead> = match path {
        Some(p) => Box::new(BufReader::new(File::open(p)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let raw: RawRatings = match serde_json::from_str(&line) {
            Ok(raw) => raw,
            Err(e) => {
                println!("error\t{e}");
                continue;
            }
        };
        match service.evaluate(&raw) {
            Ok(prediction) => println!(
                "{:.2}\t{}",
                prediction.verdict.confidence, prediction.verdict.label
            ),
            Err(e) => println!("error\t{e}"),
        }
    }

    Ok(())
}
