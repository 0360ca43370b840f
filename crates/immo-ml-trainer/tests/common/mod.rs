//! Synthetic listing datasets shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use immo_ml_trainer::{FeatureValue, Record, TrainerConfig};

pub const MAPPING: &str = r#"
columns:
  price:
    - "Price (€)"
    - prijs
  surface:
    - "living area(m²)"
  town:
    - Town
"#;

pub const TOWNS: [&str; 4] = ["Gent", "Brugge", "Kortrijk", "Aalst"];
const TOWN_OFFSET: [f64; 4] = [40_000.0, 30_000.0, 0.0, -10_000.0];
const POSTAL: [u32; 4] = [9000, 8000, 8500, 9300];
const CONDITIONS: [&str; 3] = ["good", "new", "to renovate"];

pub struct Listing {
    pub surface: f64,
    pub bedrooms: f64,
    pub town: usize,
    pub house: bool,
    pub condition: usize,
}

impl Listing {
    pub fn nth(i: usize) -> Self {
        Listing {
            surface: (60 + (i * 37) % 150) as f64,
            bedrooms: (1 + i % 4) as f64,
            town: (i / 2) % 4,
            house: i % 5 < 3,
            condition: i % 3,
        }
    }

    /// Exactly linear in the one-hot encoded features.
    pub fn price(&self) -> f64 {
        1_500.0 * self.surface
            + 10_000.0 * self.bedrooms
            + TOWN_OFFSET[self.town]
            + if self.house { 20_000.0 } else { 0.0 }
    }

    pub fn record(&self) -> Record {
        let mut r = Record::new();
        r.insert("surface".into(), FeatureValue::Number(self.surface));
        r.insert("bedrooms".into(), FeatureValue::Number(self.bedrooms));
        r.insert("postal_code".into(), FeatureValue::Number(POSTAL[self.town] as f64));
        r.insert("town".into(), FeatureValue::Text(TOWNS[self.town].into()));
        r.insert(
            "property_type".into(),
            FeatureValue::Text(if self.house { "house" } else { "apartment" }.into()),
        );
        r.insert(
            "condition".into(),
            FeatureValue::Text(CONDITIONS[self.condition].into()),
        );
        r
    }
}

/// `250000` → `250 000`
fn spaced(v: f64) -> String {
    let digits = format!("{:.0}", v);
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Scraped-style CSV: aliased headers, currency and unit decorations, one
/// price on request and one listing without a surface.
pub fn listings_csv(n: usize) -> String {
    let mut csv = String::from("url,Price (€),living area(m²),bedrooms,postal_code,Town,property_type,condition\n");
    for i in 0..n {
        let l = Listing::nth(i);
        csv.push_str(&format!(
            "https://example.org/{},\"€{}\",{} m²,{},{},{},{},{}\n",
            i,
            spaced(l.price()),
            l.surface,
            l.bedrooms,
            POSTAL[l.town],
            TOWNS[l.town],
            if l.house { "house" } else { "apartment" },
            CONDITIONS[l.condition],
        ));
    }
    csv.push_str("https://example.org/x,on request,100 m²,2,9000,Gent,house,good\n");
    csv.push_str("https://example.org/y,\"€300 000\",,3,8000,Brugge,house,new\n");
    csv
}

pub struct Workspace {
    pub dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("data")).expect("data dir");
        fs::write(dir.path().join("feature_mapping.yaml"), MAPPING).expect("mapping");
        Workspace { dir }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn model_dir(&self) -> PathBuf {
        self.dir.path().join("models")
    }

    pub fn add_dataset(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.data_dir().join(file_name);
        fs::write(&path, content).expect("write dataset");
        path
    }

    pub fn config(&self, model_types: &[&str]) -> TrainerConfig {
        TrainerConfig {
            data_dir: self.data_dir(),
            model_dir: self.model_dir(),
            mapping_path: self.dir.path().join("feature_mapping.yaml"),
            model_types: model_types.iter().map(|s| s.to_string()).collect(),
            ..TrainerConfig::default()
        }
    }
}

pub fn exists(path: &Path) -> bool {
    path.is_file()
}
