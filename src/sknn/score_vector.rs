use hashbrown::HashMap;

use crate::io::ItemId;
use crate::sknn::ItemScore;

/// Materializes the sparse score accumulator into the dense ranked vector
/// over the full training catalog.
pub fn build_ranked(
    item_scores: HashMap<ItemId, f64>,
    catalog: &[ItemId],
    input_item_id: ItemId,
    normalize: bool,
) -> Vec<ItemScore> {
    let mut predictions: Vec<ItemScore> = catalog
        .iter()
        .map(|item_id| {
            ItemScore::new(*item_id, item_scores.get(item_id).copied().unwrap_or(0.0))
        })
        .collect();

    // never recommend the item the user is looking at right now
    if let Ok(position) = catalog.binary_search(&input_item_id) {
        predictions[position].score = 0.0;
    }

    if normalize {
        let max_score = predictions
            .iter()
            .map(|prediction| prediction.score)
            .fold(0.0_f64, f64::max);
        // an all-zero vector stays all-zero instead of dividing into NaN
        if max_score > 0.0 {
            for prediction in predictions.iter_mut() {
                prediction.score /= max_score;
            }
        }
    }

    // ItemScore orders score descending with ascending item id tie-breaks
    predictions.sort_unstable();
    predictions
}
