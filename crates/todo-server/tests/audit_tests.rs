//! Integration tests for trigger-based audit logging
//!
//! All tests use `#[sqlx::test]` and need `DATABASE_URL`.

use sqlx::{PgPool, Row};
use todo_server::audit::{
    audit_trail, current_performed_by, set_performed_by, AuditLogger, AuditOperation, AuditTarget,
    PerformedBy,
};
use todo_server::features::shared::UserId;
use todo_server::features::todos::{
    commands::{create, delete, update},
    CreateTodoCommand, DeleteTodoCommand, Todo, UpdateTodoCommand,
};

async fn provisioned(pool: &PgPool) -> AuditLogger {
    let logger = AuditLogger::for_entity::<Todo>(pool.clone()).unwrap();
    logger.provision().await.unwrap();
    logger
}

async fn audit_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM todos_audit")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_provisioning_is_idempotent(pool: PgPool) {
    let logger = provisioned(&pool).await;
    logger.provision().await.unwrap();
    logger.create_triggers().await.unwrap();

    let triggers: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT t.tgname::text
        FROM pg_trigger t
        JOIN pg_class c ON c.oid = t.tgrelid
        WHERE c.relname = 'todos' AND NOT t.tgisinternal
        ORDER BY t.tgname
        "#,
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(
        triggers,
        vec!["todos_audit_delete", "todos_audit_insert", "todos_audit_update"]
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_concurrent_provisioning(pool: PgPool) {
    let first = AuditLogger::for_entity::<Todo>(pool.clone()).unwrap();
    let second = first.clone();

    let (a, b) = tokio::join!(first.provision(), second.provision());
    a.unwrap();
    b.unwrap();
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_one_record_per_mutation(pool: PgPool) {
    provisioned(&pool).await;
    let alice = UserId::parse("alice").unwrap();

    let todo = create::handle(pool.clone(), &alice, CreateTodoCommand::default())
        .await
        .unwrap();
    assert_eq!(audit_count(&pool).await, 1);

    let command = UpdateTodoCommand {
        id: todo.id,
        completed: Some(true),
        ..Default::default()
    };
    update::handle(pool.clone(), &alice, command).await.unwrap();
    assert_eq!(audit_count(&pool).await, 2);

    delete::handle(pool.clone(), &alice, DeleteTodoCommand { id: todo.id })
        .await
        .unwrap();
    assert_eq!(audit_count(&pool).await, 3);

    let target = AuditTarget::for_entity::<Todo>().unwrap();
    let trail = audit_trail(&pool, &target, todo.id, None).await.unwrap();
    let operations: Vec<_> = trail.iter().filter_map(|r| r.operation()).collect();
    assert_eq!(
        operations,
        vec![AuditOperation::Insert, AuditOperation::Update, AuditOperation::Delete]
    );
    assert!(trail.iter().all(|r| r.performed_by.as_deref() == Some("alice")));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_failed_delete_writes_no_record(pool: PgPool) {
    provisioned(&pool).await;
    let alice = UserId::parse("alice").unwrap();
    let bob = UserId::parse("bob").unwrap();

    let todo = create::handle(pool.clone(), &alice, CreateTodoCommand::default())
        .await
        .unwrap();
    assert!(delete::handle(pool.clone(), &bob, DeleteTodoCommand { id: todo.id })
        .await
        .is_err());

    assert_eq!(audit_count(&pool).await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_mirrored_columns_hold_row_image(pool: PgPool) {
    provisioned(&pool).await;
    let alice = UserId::parse("alice").unwrap();

    let command = CreateTodoCommand {
        title: Some("mirror".to_string()),
        ..Default::default()
    };
    let todo = create::handle(pool.clone(), &alice, command).await.unwrap();
    delete::handle(pool.clone(), &alice, DeleteTodoCommand { id: todo.id })
        .await
        .unwrap();

    let rows = sqlx::query(
        "SELECT audit_operation, id, title, user_id FROM todos_audit ORDER BY audit_id",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(rows.len(), 2);
    for row in rows {
        assert_eq!(row.get::<i64, _>("id"), todo.id);
        assert_eq!(row.get::<String, _>("title"), "mirror");
        assert_eq!(row.get::<String, _>("user_id"), "alice");
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_performed_by_is_transaction_local(pool: PgPool) {
    provisioned(&pool).await;

    // One connection, so the second transaction reuses the first one's session
    let mut conn = pool.acquire().await.unwrap();
    {
        let mut tx = sqlx::Acquire::begin(&mut *conn).await.unwrap();
        set_performed_by(&mut tx, &PerformedBy::new("alice").unwrap())
            .await
            .unwrap();
        assert_eq!(
            current_performed_by(&mut tx).await.unwrap().as_deref(),
            Some("alice")
        );
        tx.commit().await.unwrap();
    }

    assert_eq!(current_performed_by(&mut conn).await.unwrap(), None);

    // A mutation outside any performed-by context is still recorded
    sqlx::query("INSERT INTO todos (title, user_id) VALUES ('direct', 'carol')")
        .execute(&mut *conn)
        .await
        .unwrap();

    let performed_by: Option<String> =
        sqlx::query_scalar("SELECT audit_performed_by FROM todos_audit ORDER BY audit_id DESC LIMIT 1")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
    assert_eq!(performed_by, None);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_rolled_back_mutation_writes_no_record(pool: PgPool) {
    provisioned(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    set_performed_by(&mut tx, &PerformedBy::new("alice").unwrap())
        .await
        .unwrap();
    sqlx::query("INSERT INTO todos (title, user_id) VALUES ('gone', 'alice')")
        .execute(&mut *tx)
        .await
        .unwrap();
    tx.rollback().await.unwrap();

    assert_eq!(audit_count(&pool).await, 0);
}
