use crate::state;
use crate::error;

pub async fn cleanup(state: state::ArcShared) -> error::Result<()> {
    let today = chrono::Utc::now();
    let mut conn = state.pool().get().await?;

    let transaction = conn.transaction().await?;

    let count = transaction.execute(
        "delete from auth_session where expires <= $1",
        &[&today]
    ).await?;

    transaction.commit().await?;

    tracing::info!("dropped {count} sessions");

    Ok(())
}
