use super::IndexedItem;
use crate::blooms;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusteredItem {
    pub name: String,
    /// Normalized bloom signature, e.g. `"Remember/Apply"`.
    pub signature: String,
    pub max_score: f64,
    /// Position in the unfiltered classwork, and so in every score vector.
    pub source_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderBand {
    pub signature: String,
    /// Columns covered. Zero only for the placeholder of an empty CO.
    pub count: usize,
}

impl HeaderBand {
    pub fn width(&self) -> usize {
        self.count.max(1)
    }
}

/// A CO after clustering, ready for the renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusteredOutcome {
    pub name: String,
    pub label: String,
    pub items: Vec<ClusteredItem>,
    pub bands: Vec<HeaderBand>,
}

impl ClusteredOutcome {
    pub fn new(name: &str, label: String, classwork: &[IndexedItem]) -> Self {
        let items = cluster_items(classwork);
        let bands = header_bands(&items);
        Self {
            name: name.to_string(),
            label,
            items,
            bands,
        }
    }

    /// Item columns plus Total, individual flag and class flag.
    pub fn width(&self) -> usize {
        self.item_columns() + 3
    }

    pub fn item_columns(&self) -> usize {
        self.bands.iter().map(HeaderBand::width).sum()
    }
}

pub fn cluster_items(classwork: &[IndexedItem]) -> Vec<ClusteredItem> {
    let mut items: Vec<(Vec<usize>, ClusteredItem)> = classwork
        .iter()
        .map(|cw| {
            let signature = blooms::normalize(&cw.blooms);
            (
                blooms::rank_vector(&signature),
                ClusteredItem {
                    name: cw.name.clone(),
                    signature,
                    max_score: cw.max_score,
                    source_index: cw.source_index,
                },
            )
        })
        .collect();
    // Vec ordering is element-wise with the shorter prefix first.
    items.sort_by(|(a, _), (b, _)| a.cmp(b));
    items.into_iter().map(|(_, item)| item).collect()
}

pub fn header_bands(items: &[ClusteredItem]) -> Vec<HeaderBand> {
    let mut bands: Vec<HeaderBand> = Vec::new();
    for item in items {
        match bands.last_mut() {
            Some(band) if band.signature == item.signature => band.count += 1,
            _ => bands.push(HeaderBand {
                signature: item.signature.clone(),
                count: 1,
            }),
        }
    }
    if bands.is_empty() {
        bands.push(HeaderBand {
            signature: String::new(),
            count: 0,
        });
    }
    bands
}
