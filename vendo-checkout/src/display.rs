use vendo_core::product::ProductDescriptor;

/// Donation tiers that get a canonical label regardless of how the store
/// decorates the listing title.
const CANONICAL_LABELS: [&str; 7] = [
    "$1 USD", "$2 USD", "$5 USD", "$10 USD", "$20 USD", "$50 USD", "$100 USD",
];

/// A product prepared for presentation: normalized label plus the
/// descriptor needed to launch its purchase flow.
#[derive(Debug, Clone)]
pub struct DisplayItem {
    label: String,
    descriptor: ProductDescriptor,
}

impl DisplayItem {
    /// Build the presentation list: ascending by price, ties keeping the
    /// store's order, with titles reduced to their canonical label where
    /// one applies.
    pub fn from_descriptors(mut descriptors: Vec<ProductDescriptor>) -> Vec<DisplayItem> {
        descriptors.sort_by_key(|descriptor| descriptor.price_amount_micros);
        descriptors
            .into_iter()
            .map(|descriptor| DisplayItem {
                label: normalize_label(&descriptor.title),
                descriptor,
            })
            .collect()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn descriptor(&self) -> &ProductDescriptor {
        &self.descriptor
    }
}

/// Labels in presentation order, ready for a choice dialog.
pub fn labels(items: &[DisplayItem]) -> Vec<String> {
    items.iter().map(|item| item.label.clone()).collect()
}

fn normalize_label(title: &str) -> String {
    for canonical in CANONICAL_LABELS {
        if title.contains(canonical) {
            return canonical.to_string();
        }
    }
    title.to_string()
}
