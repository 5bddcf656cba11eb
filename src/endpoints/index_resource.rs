extern crate sys_info;

use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use web::Data;

use crate::dataframeutils::SharedHandlesAndConfig;

#[get("/internal")]
pub async fn internal(config: Data<SharedHandlesAndConfig>) -> HttpResponse {
    let mut html = "<html>covisit: realtime session based recommendations.<br />".to_string();

    let data_stats = config.training_data_stats.as_ref();
    html.push_str("<h3>Training data</h3>");
    html.push_str("Loaded: ");
    html.push_str(&*data_stats.descriptive_name);
    html.push_str("<br />Qty Training Records: ");
    html.push_str(&*data_stats.qty_records.to_string());
    html.push_str("<br />Qty Unique SessionIds: ");
    html.push_str(&*data_stats.qty_unique_session_ids.to_string());
    html.push_str("<br />Qty Unique ItemIds: ");
    html.push_str(&*data_stats.qty_unique_item_ids.to_string());
    html.push_str("<br />Min Date Time: ");
    html.push_str(&data_stats.min_time_date_time.to_string());
    html.push_str("<br />Max Date Time: ");
    html.push_str(&data_stats.max_time_date_time.to_string());
    html.push_str("<br />Age (hours): ");

    let age_hours = (Utc::now().naive_utc() - data_stats.max_time_date_time).num_hours();
    html.push_str(&*age_hours.to_string());

    html.push_str("<h3>Model</h3>");
    html.push_str("hyperparameters");
    html.push_str("<br />m : ");
    html.push_str(&config.sample_size_m.to_string());
    html.push_str(" (most recent candidate sessions for an evolving session)");
    html.push_str("<br />k : ");
    html.push_str(&config.neighborhood_size_k.to_string());
    html.push_str(" (top `k` closest neighbor sessions for item scoring)");
    html.push_str("<br />Normalize scores: ");
    html.push_str(&config.normalize.to_string());
    html.push_str("<br />Max items in evolving session: ");
    html.push_str(&config.max_items_in_session.to_string());
    html.push_str("<br />Qty items to recommend: ");
    html.push_str(&config.num_items_to_recommend.to_string());
    html.push_str("<br /><a href=\"/v1/recommend?session_id=144&user_consent=true&item_id=1001004010971015\">v1 endpoint of our model</a>");

    html.push_str("<h3>Machine instance</h3>");
    html.push_str("<br />Qty CPU's detected: ");
    html.push_str(&*sys_info::cpu_num().unwrap_or(0).to_string());
    html.push_str("<br />Qty actix workers set: ");
    html.push_str(&config.qty_workers.to_string());
    html.push_str("<br />CPU speed: ");
    html.push_str(&*sys_info::cpu_speed().unwrap_or(0).to_string());
    html.push_str("MHz");

    html.push_str("<h3>Session store</h3>");
    html.push_str("<br />Compaction TTL: ");
    html.push_str(&*config.db_compaction_ttl_in_secs.to_string());
    html.push_str(" seconds");
    html.push_str("<h3>Metrics</h3>");
    html.push_str("<a href=\"/internal/prometheus\">prometheus</a>");
    html.push_str("</html>");

    HttpResponse::Ok().body(html)
}
