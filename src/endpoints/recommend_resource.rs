use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use uuid::Builder;

use crate::dataframeutils::SharedHandlesAndConfig;
use crate::io::ItemId;
use crate::sknn;
use crate::sknn::state::PredictionSessionState;

#[derive(Debug, Deserialize)]
pub struct V1QueryParams {
    item_id: u64,
    session_id: String,
    user_consent: bool,
}

// Main recommendation endpoint. Session affinity upstream routes on the
// same `session_id` query parameter, hence GET parameters instead of an
// X-header.
#[get("/v1/recommend")]
pub async fn v1_recommend(
    data: web::Data<SharedHandlesAndConfig>,
    query: web::Query<V1QueryParams>,
) -> HttpResponse {
    let most_recent_item = query.item_id;
    let user_consent = query.user_consent;
    let session_id_digest = md5::compute(&query.session_id);
    let evolving_session_id = Builder::from_bytes(session_id_digest.0).build().as_u128();

    let engine = data.engine.as_ref();
    let session_store = data.session_store.as_ref();

    let k = data.neighborhood_size_k;
    let m = data.sample_size_m;
    let normalize = data.normalize;
    let how_many = data.num_items_to_recommend;
    let max_items_in_session = data.max_items_in_session;

    let evolving_items: Vec<ItemId> = if user_consent {
        let mut evolving_items = session_store.get_evolving_items(&evolving_session_id);
        if evolving_items.is_empty() {
            evolving_items.push(most_recent_item);
        } else if evolving_items.last().unwrap() != &most_recent_item {
            evolving_items.push(most_recent_item);
            if evolving_items.len() > max_items_in_session {
                // Reduce the amount of evolving items to max_items_in_session.
                evolving_items.drain(0..1);
            }
        }
        session_store.update_evolving_items(&evolving_session_id, &evolving_items);
        evolving_items
    } else {
        vec![most_recent_item]
    };

    // stateless ranking: the per-request state is rebuilt from the stored
    // item history
    let mut state = PredictionSessionState::from_items(0, &evolving_items);
    let predictions = sknn::predict(engine, &mut state, k, m, normalize);

    let recommended_items: Vec<ItemId> = predictions
        .iter()
        .filter(|scored| scored.score > 0.0)
        .take(how_many)
        .map(|scored| scored.id)
        .collect();

    HttpResponse::Ok().json(recommended_items)
}
