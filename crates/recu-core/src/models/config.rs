//! Configuration structures for receipt field extraction.
//!
//! Every keyword list, weight and threshold the extractors use lives here so
//! that tuning never touches control flow. The defaults are calibrated on
//! French receipts and invoices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::models::receipt::ExpenseCategory;

/// Main configuration for the recu pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecuConfig {
    /// Field extraction rules.
    pub extraction: ExtractionConfig,

    /// Output settings used by the command-line front end.
    pub output: OutputConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Currency reported with every amount. No detection is attempted.
    pub default_currency: String,

    /// Total amount (TTC) selection rules.
    pub total: TotalRules,

    /// VAT and net amount (HT) rules.
    pub vat: VatRules,

    /// Merchant name heuristics.
    pub merchant: MerchantRules,

    /// Expense categories, checked in order. The first hit wins.
    pub categories: Vec<CategoryRule>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_currency: "EUR".to_string(),
            total: TotalRules::default(),
            vat: VatRules::default(),
            merchant: MerchantRules::default(),
            categories: default_categories(),
        }
    }
}

/// A group of keywords sharing one score contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordWeight {
    /// Substrings looked up in the normalized line.
    pub keywords: Vec<String>,
    /// Score added when at least one keyword is present.
    pub weight: i32,
}

impl KeywordWeight {
    pub fn new(keywords: &[&str], weight: i32) -> Self {
        Self {
            keywords: strings(keywords),
            weight,
        }
    }
}

/// Bonus for candidates found late in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionBonus {
    /// Relative position (line index / line count) that must be exceeded.
    pub after: f64,
    /// Score added past that position.
    pub weight: i32,
}

/// Rules for picking the total amount among all numeric tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TotalRules {
    /// Administrative identifiers (bank, registry, phone). Lines are always skipped.
    pub hard_blacklist: Vec<String>,

    /// Reference markers. Lines are skipped unless they carry a total keyword.
    pub soft_blacklist: Vec<String>,

    /// Keywords that mark a line as talking about the amount due.
    pub total_keywords: Vec<String>,

    /// Tax breakdown markers. Lines without a total keyword are skipped.
    pub tax_keywords: Vec<String>,

    /// Exclusive keyword tiers, strongest first. Only the first tier present scores.
    pub keyword_tiers: Vec<KeywordWeight>,

    /// Independent bonuses and penalties.
    pub modifiers: Vec<KeywordWeight>,

    /// Bonuses by position in the document.
    pub position_bonuses: Vec<PositionBonus>,

    /// Values above this are never an amount on a receipt.
    pub max_amount: Decimal,

    /// First integer value treated as a calendar year.
    pub year_min: i64,

    /// Last integer value treated as a calendar year.
    pub year_max: i64,
}

impl Default for TotalRules {
    fn default() -> Self {
        Self {
            hard_blacklist: default_hard_blacklist(),
            soft_blacklist: strings(&["ref", "référence", "facture n", " n°", "numéro"]),
            total_keywords: strings(&["total", "ttc", "payer", "montant"]),
            tax_keywords: strings(&["tva"]),
            keyword_tiers: vec![
                KeywordWeight::new(
                    &["total ttc", "montant total", "total à payer", "net à payer"],
                    5,
                ),
                KeywordWeight::new(&["total", "a payer", "à payer"], 4),
            ],
            modifiers: vec![
                KeywordWeight::new(&["ttc"], 3),
                KeywordWeight::new(&["€", "eur"], 2),
                KeywordWeight::new(&["tva"], -4),
                KeywordWeight::new(&["ht"], -4),
                KeywordWeight::new(&["hors taxe"], -4),
                KeywordWeight::new(&["acompte"], -4),
                KeywordWeight::new(&["remise"], -4),
                KeywordWeight::new(&["frais"], -2),
            ],
            position_bonuses: vec![
                PositionBonus { after: 0.6, weight: 1 },
                PositionBonus { after: 0.8, weight: 1 },
            ],
            max_amount: Decimal::new(100_000, 0),
            year_min: 1990,
            year_max: 2030,
        }
    }
}

/// Rules for the VAT amount and its net-amount fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VatRules {
    /// Lines containing any of these are never VAT lines.
    pub blacklist: Vec<String>,

    /// Whole words marking a VAT line.
    pub vat_keywords: Vec<String>,

    /// Whole words marking a net amount (HT) line.
    pub ht_keywords: Vec<String>,

    /// Substrings that also mark a net amount line.
    pub ht_phrases: Vec<String>,

    /// Values this close to the known total are a restated total, not VAT.
    pub total_tolerance: Decimal,
}

impl Default for VatRules {
    fn default() -> Self {
        let mut blacklist = default_hard_blacklist();
        blacklist.extend(strings(&[
            "facture n", "ref", "référence", "numéro", "capital", "social",
        ]));

        Self {
            blacklist,
            vat_keywords: strings(&["tva", "vat", "taxe", "t.v.a.", "t.v.a"]),
            ht_keywords: strings(&[
                "total ht", "montant ht", "hors taxe", "total net ht", "sous-total ht",
                "h.t.", "h.t", "ht",
            ]),
            ht_phrases: strings(&["hors taxe"]),
            total_tolerance: Decimal::new(5, 2),
        }
    }
}

/// Heuristics for the merchant name at the top of a receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantRules {
    /// Number of non-empty lines inspected from the top.
    pub max_lines: usize,

    /// Shorter lines are never a name.
    pub min_length: usize,

    /// Header and payment words that disqualify a line.
    pub skip_keywords: Vec<String>,

    /// Metadata labels that disqualify a line when it starts with them.
    pub skip_prefixes: Vec<String>,

    /// Legal-form words that make a line the preferred candidate.
    pub company_forms: Vec<String>,
}

impl Default for MerchantRules {
    fn default() -> Self {
        Self {
            max_lines: 15,
            min_length: 2,
            skip_keywords: strings(&[
                "facture", "invoice", "receipt", "ticket", "bill", "reçu", "cb", "visa",
                "mastercard", "total", "montant", "siret", "tva", "merci", "thank you",
                "welcome", "bienvenue", "page",
            ]),
            skip_prefixes: strings(&[
                "date", "tel", "fax", "http", "www", "email", "e-mail", "web",
            ]),
            company_forms: strings(&[
                "sarl", "sas", "sa", "sci", "eurl", "inc", "ltd", "gmbh", "slu", "spa",
                "societe", "société",
            ]),
        }
    }
}

/// Keywords assigning an expense category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: ExpenseCategory,
    /// Whole words looked up in the receipt text and merchant name.
    pub keywords: Vec<String>,
}

fn default_categories() -> Vec<CategoryRule> {
    vec![
        CategoryRule {
            category: ExpenseCategory::Restaurant,
            keywords: strings(&[
                "restaurant", "food", "burger", "pizza", "cafe", "café", "coffee",
                "starbucks", "mcdo", "brasserie",
            ]),
        },
        CategoryRule {
            category: ExpenseCategory::Transport,
            keywords: strings(&[
                "uber", "taxi", "train", "sncf", "transport", "flight", "parking", "péage",
            ]),
        },
        CategoryRule {
            category: ExpenseCategory::Lodging,
            keywords: strings(&["hotel", "hôtel", "airbnb", "logement"]),
        },
        CategoryRule {
            category: ExpenseCategory::Fuel,
            keywords: strings(&[
                "essence", "carburant", "fuel", "gazole", "diesel", "sp95", "sp98", "shell",
                "bp",
            ]),
        },
    ]
}

fn default_hard_blacklist() -> Vec<String> {
    strings(&[
        "iban", "bic", "siret", "siren", "intracom", "rcs", "immatriculation", "téléphone",
        "tel:", "tel ", "fax",
    ])
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Output settings for the command-line front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (`json`, `text` or `csv`).
    pub format: String,

    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: true,
        }
    }
}

impl ExtractionConfig {
    /// Check numeric settings for values the extractors cannot work with.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.total.year_min > self.total.year_max {
            return Err(ConfigError::Value {
                field: "total.year_min".to_string(),
                reason: format!(
                    "{} is after year_max {}",
                    self.total.year_min, self.total.year_max
                ),
            });
        }
        if self.total.max_amount <= Decimal::ZERO {
            return Err(ConfigError::Value {
                field: "total.max_amount".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.vat.total_tolerance.is_sign_negative() {
            return Err(ConfigError::Value {
                field: "vat.total_tolerance".to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        if let Some(bonus) = self
            .total
            .position_bonuses
            .iter()
            .find(|b| !(0.0..=1.0).contains(&b.after))
        {
            return Err(ConfigError::Value {
                field: "total.position_bonuses".to_string(),
                reason: format!("position {} is outside 0.0..=1.0", bonus.after),
            });
        }
        Ok(())
    }
}

impl RecuConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(ConfigError::from)?;
        config.extraction.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::from)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
