use crate::config::PersistenceConfig;
use crate::db::*;
use tempfile::TempDir;


/// Open a fresh database with its media directory inside `dir`
async fn open(dir: &TempDir) -> Database {
    let config = PersistenceConfig {
        database_path: dir.path().join("host.db"),
        media_dir: dir.path().join("uploads"),
        media_url_prefix: "/uploads".to_string(),
    };
    Database::new(&config).await.unwrap()
}

async fn register(db: &Database, uid: &str, required: &[&str]) {
    db.register_content_type(&NewContentType {
        uid: uid.to_string(),
        display_name: uid.to_string(),
        required_fields: required.iter().map(|f| f.to_string()).collect(),
    })
    .await
    .unwrap();
}
