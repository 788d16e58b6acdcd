use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{
    MODELS_DOMAIN, SOURCE_TREE_DELIMITER, SOURCE_TREE_EXCLUDED_DOMAINS, SOURCE_TREE_OTHER,
    SOURCE_TREE_TOP_N,
};
use crate::pipeline::processing::normalize::NormalizedDatasetRecord;
use crate::types::GroupTable;

const MAX_LABEL_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeLeaf {
    pub name: String,
    pub count: u64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeDomain {
    pub name: String,
    pub total: u64,
    pub label: String,
    pub sources: Vec<TreeLeaf>,
}

/// Text sources grouped by domain, largest domains first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceTree {
    pub total: u64,
    pub domains: Vec<TreeDomain>,
    pub unmatched: BTreeSet<String>,
}

impl SourceTree {
    /// `"<domain label>]<source label>"` per leaf, the input of a delimited tree mark
    pub fn paths(&self) -> Vec<String> {
        self.domains
            .iter()
            .flat_map(|domain| {
                domain
                    .sources
                    .iter()
                    .map(move |leaf| format!("{}{}{}", domain.label, SOURCE_TREE_DELIMITER, leaf.label))
            })
            .collect()
    }

    pub fn domain(&self, name: &str) -> Option<&TreeDomain> {
        self.domains.iter().find(|d| d.name == name)
    }
}

pub fn source_tree(records: &[NormalizedDatasetRecord], domain_groups: &GroupTable) -> SourceTree {
    let mut domain_of: HashMap<&str, &str> = HashMap::new();
    for (domain, sources) in domain_groups {
        for source in sources {
            domain_of.insert(source.as_str(), domain.as_str());
        }
    }

    let mut source_counts: IndexMap<&str, u64> = IndexMap::new();
    for record in records {
        for source in &record.text_sources {
            *source_counts.entry(source.as_str()).or_insert(0) += 1;
        }
    }

    let mut nested: IndexMap<String, IndexMap<String, u64>> = IndexMap::new();
    let mut unmatched = BTreeSet::new();
    for (source, count) in source_counts {
        match domain_of.get(source) {
            Some(domain) => {
                nested
                    .entry(domain.to_string())
                    .or_default()
                    .insert(source.to_string(), count);
            }
            None => {
                unmatched.insert(source.to_string());
            }
        }
    }
    if !unmatched.is_empty() {
        debug!(unmatched = ?unmatched, "Text sources without a domain");
    }

    for excluded in SOURCE_TREE_EXCLUDED_DOMAINS {
        nested.shift_remove(excluded);
    }

    let models = nested.entry(MODELS_DOMAIN.to_string()).or_default();
    for record in records {
        for model in &record.model_generated {
            if !model.trim().is_empty() {
                *models.entry(model.clone()).or_insert(0) += 1;
            }
        }
    }

    nested.retain(|_, sources| !sources.is_empty());

    let total: u64 = nested.values().flat_map(|s| s.values()).sum();

    let mut domains: Vec<(String, u64, IndexMap<String, u64>)> = nested
        .into_iter()
        .map(|(name, sources)| {
            let sum = sources.values().sum();
            (name, sum, sources)
        })
        .collect();
    domains.sort_by(|a, b| b.1.cmp(&a.1));

    let domains = domains
        .into_iter()
        .map(|(name, domain_total, sources)| {
            let mut ranked: Vec<(String, u64)> = sources.into_iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1));

            let rest: u64 = ranked.iter().skip(SOURCE_TREE_TOP_N).map(|(_, c)| c).sum();
            let has_rest = ranked.len() > SOURCE_TREE_TOP_N;
            ranked.truncate(SOURCE_TREE_TOP_N);
            if has_rest {
                ranked.push((SOURCE_TREE_OTHER.to_string(), rest));
            }

            let sources = ranked
                .into_iter()
                .map(|(source, count)| TreeLeaf {
                    label: format!("{} ({})", truncate_label(&source), percent(count, total)),
                    name: source,
                    count,
                })
                .collect();

            TreeDomain {
                label: format!("{} ({})", name, percent(domain_total, total)),
                name,
                total: domain_total,
                sources,
            }
        })
        .collect();

    SourceTree {
        total,
        domains,
        unmatched,
    }
}

fn percent(count: u64, total: u64) -> String {
    format!("{:.2}%", count as f64 / total as f64 * 100.0)
}

fn truncate_label(name: &str) -> String {
    if name.chars().count() < MAX_LABEL_CHARS {
        name.to_string()
    } else {
        let head: String = name.chars().take(MAX_LABEL_CHARS - 1).collect();
        format!("{}...", head)
    }
}
