//! Keyword-scoring categorizer.
//!
//! Every keyword category is scored independently: +2 when a keyword occurs
//! anywhere in the description, and a further +5 when it occurs as a whole
//! word. The highest score wins; ties go to the category declared first, and
//! a description that scores nothing falls back to [`Category::Other`].

use std::collections::HashMap;

use crate::models::{Category, Transaction};

pub(crate) const SUBSTRING_SCORE: u32 = 2;
pub(crate) const WHOLE_WORD_SCORE: u32 = 5;

const FOOD_KEYWORDS: &[&str] = &[
    "café", "restaurante", "comida", "pizza", "burger", "mercado",
    "supermercado", "padaria", "lanchonete", "delivery", "ifood",
    "mcdonalds", "kfc", "subway", "starbucks", "açaí", "sorvete",
    "jantar", "almoço", "café da manhã", "lanche", "bebida", "bar",
    "cerveja", "vinho", "água", "refrigerante", "suco", "chocolate",
];

const TRANSPORT_KEYWORDS: &[&str] = &[
    "uber", "taxi", "metro", "bus", "ônibus", "trem", "avião",
    "passagem", "combustível", "gasolina", "estacionamento",
    "pedágio", "viagem", "bilhete", "cartão transporte", "99",
    "cabify", "blablacar", "ryanair", "tap", "latam", "azul",
];

const LEISURE_KEYWORDS: &[&str] = &[
    "cinema", "bar", "festa", "show", "museu", "teatro", "parque",
    "netflix", "spotify", "jogo", "game", "diversão", "balada",
    "praia", "turismo", "passeio", "ingresso", "evento", "concert",
    "festival", "clube", "academia", "gym", "esporte",
];

const HOUSING_KEYWORDS: &[&str] = &[
    "aluguel", "rent", "casa", "apartamento", "hotel", "hostel",
    "condomínio", "água", "luz", "energia", "gás", "internet",
    "wifi", "limpeza", "manutenção", "móveis", "airbnb", "booking",
];

fn default_keywords(category: Category) -> &'static [&'static str] {
    match category {
        Category::Food => FOOD_KEYWORDS,
        Category::Transport => TRANSPORT_KEYWORDS,
        Category::Leisure => LEISURE_KEYWORDS,
        Category::Housing => HOUSING_KEYWORDS,
        Category::Other => &[],
    }
}

/// Ordered keyword set of one category. Duplicates are dropped on insert.
#[derive(Debug, Clone)]
pub(crate) struct KeywordSet {
    pub(crate) category: Category,
    keywords: Vec<String>,
}

impl KeywordSet {
    fn new(category: Category) -> Self {
        let mut set = Self {
            category,
            keywords: Vec::new(),
        };
        for kw in default_keywords(category) {
            set.insert(kw);
        }
        set
    }

    fn insert(&mut self, keyword: &str) {
        let kw = keyword.trim().to_lowercase();
        if !kw.is_empty() && !self.keywords.contains(&kw) {
            self.keywords.push(kw);
        }
    }

    pub(crate) fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Score of an already lower-cased description.
    fn score(&self, description: &str, padded: &str) -> u32 {
        self.keywords
            .iter()
            .map(|kw| {
                let mut s = 0;
                if description.contains(kw.as_str()) {
                    s += SUBSTRING_SCORE;
                }
                if padded.contains(&format!(" {kw} ")) {
                    s += WHOLE_WORD_SCORE;
                }
                s
            })
            .sum()
    }
}

/// Per-category scores of one description, in scoring order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CategoryScores {
    scores: Vec<(Category, u32)>,
}

impl CategoryScores {
    pub(crate) fn get(&self, category: Category) -> u32 {
        self.scores
            .iter()
            .find(|(c, _)| *c == category)
            .map_or(0, |(_, s)| *s)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &(Category, u32)> {
        self.scores.iter()
    }

    /// First category holding the strictly greatest score, or the fallback
    /// when nothing scored.
    pub(crate) fn winner(&self) -> Category {
        let mut best: Option<(Category, u32)> = None;
        for &(category, score) in &self.scores {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((category, score)),
            }
        }
        match best {
            Some((category, score)) if score > 0 => category,
            _ => Category::fallback(),
        }
    }
}

pub(crate) struct Categorizer {
    sets: Vec<KeywordSet>,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self {
            sets: Category::scored().iter().map(|c| KeywordSet::new(*c)).collect(),
        }
    }
}

impl Categorizer {
    /// Builds the default keyword sets and appends the configured extras.
    /// Keys name a category (`Category::parse`); unknown keys are returned so
    /// the caller can report them.
    pub(crate) fn with_extra_keywords(extra: &HashMap<String, Vec<String>>) -> (Self, Vec<String>) {
        let mut categorizer = Self::default();
        let mut unknown = Vec::new();

        let mut keys: Vec<&String> = extra.keys().collect();
        keys.sort();
        for key in keys {
            let set = Category::parse(key)
                .and_then(|c| categorizer.sets.iter_mut().find(|s| s.category == c));
            match set {
                Some(set) => {
                    for kw in &extra[key] {
                        set.insert(kw);
                    }
                }
                None => unknown.push(key.clone()),
            }
        }

        (categorizer, unknown)
    }

    pub(crate) fn keyword_sets(&self) -> &[KeywordSet] {
        &self.sets
    }

    pub(crate) fn score(&self, description: &str) -> CategoryScores {
        let desc_lower = description.to_lowercase();
        let padded = format!(" {desc_lower} ");
        CategoryScores {
            scores: self
                .sets
                .iter()
                .map(|set| (set.category, set.score(&desc_lower, &padded)))
                .collect(),
        }
    }

    pub(crate) fn categorize(&self, description: &str) -> Category {
        self.score(description).winner()
    }

    /// Recategorize entries still filed under the fallback category.
    pub(crate) fn categorize_batch(&self, transactions: &mut [Transaction]) -> usize {
        let mut changed = 0;
        for txn in transactions.iter_mut() {
            if txn.category == Category::fallback() {
                let category = self.categorize(&txn.description);
                if category != txn.category {
                    txn.category = category;
                    changed += 1;
                }
            }
        }
        changed
    }
}
