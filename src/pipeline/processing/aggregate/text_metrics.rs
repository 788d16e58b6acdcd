use serde::{Deserialize, Serialize};

use crate::pipeline::processing::normalize::{NormalizedDatasetRecord, RecordField};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterPoint {
    pub input_text_len: f64,
    pub target_text_len: f64,
    pub class: Option<String>,
    pub collection: String,
    pub dataset_name: String,
    pub tooltip: String,
}

/// Input vs target text length, one point per record, coloured by class
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterSeries {
    pub class_field: String,
    pub classes: Vec<String>,
    pub points: Vec<ScatterPoint>,
}

pub fn text_metric_scatter(records: &[NormalizedDatasetRecord], class_field: RecordField) -> ScatterSeries {
    let mut classes: Vec<String> = Vec::new();
    let points = records
        .iter()
        .map(|record| {
            let class = class_field.scalar(record);
            if let Some(class) = &class {
                if !classes.contains(class) {
                    classes.push(class.clone());
                }
            }
            ScatterPoint {
                input_text_len: record.input_text_len,
                target_text_len: record.target_text_len,
                class,
                collection: record.collection.clone(),
                dataset_name: record.dataset_name.clone(),
                tooltip: format!(
                    "Collection Name: {}\nDataset Name: {}\nInput Length: {}\nTarget Length: {}",
                    record.collection, record.dataset_name, record.input_text_len, record.target_text_len
                ),
            }
        })
        .collect();

    ScatterSeries {
        class_field: class_field.to_string(),
        classes,
        points,
    }
}
