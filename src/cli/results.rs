use anyhow::Result;

use crate::core::db::async_db;
use crate::scheduling;

pub async fn run(event_id: i64, db_path: &str) -> Result<()> {
    let db = async_db(db_path).await?;
    let result = scheduling::aggregate(&db, event_id).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
