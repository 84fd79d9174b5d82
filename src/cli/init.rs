use crate::core::db::{async_db, initialize_db};
use anyhow::Result;

pub async fn run(db_path: &str) -> Result<()> {
    println!("Initializing db at {}...", db_path);
    let db = async_db(db_path).await?;
    db.call(|conn| Ok(initialize_db(conn)?)).await?;
    println!("Finished initializing db");
    Ok(())
}
