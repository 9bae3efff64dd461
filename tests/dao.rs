use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use daors::drivers::{
    InMemoryResponse, InMemoryTestDriver, InMemoryTestResponseBuilder, StatementKind,
};
use daors::error::DaoError;
use daors::traits::{ConnectionFactory, DatabaseDriver};
use daors::types::{RawQueryResult, SqlValue};
use daors::{
    ColumnMap, Dao, DaoClient, DaoConfig, DataModifyEvent, DataModifyListener, ModifyKind, Record,
    Result, Row, WhereClause,
};

// Test record
#[derive(Debug, Clone, Default, PartialEq)]
struct User {
    id: Option<i64>,
    user_name: Option<String>,
    age: Option<i32>,
}

impl Record for User {
    fn fields(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("id", self.id.into()),
            ("userName", self.user_name.clone().into()),
            ("age", self.age.into()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(User {
            id: row.get("id")?,
            user_name: row.get("userName")?,
            age: row.get("age")?,
        })
    }
}

fn user_rows(rows: &[(i64, &str, i32)]) -> RawQueryResult {
    rows.iter()
        .fold(
            InMemoryTestResponseBuilder::new().columns(&["id", "user_name", "age"]),
            |builder, (id, name, age)| {
                builder.row(vec![
                    SqlValue::Int64(*id),
                    SqlValue::from(*name),
                    SqlValue::Int32(*age),
                ])
            },
        )
        .build()
}

fn count_of(n: i64) -> RawQueryResult {
    InMemoryTestResponseBuilder::scalar("count", n)
}

fn setup(driver: InMemoryTestDriver) -> (Arc<InMemoryTestDriver>, Dao<User>) {
    let in_memory_test_driver = Arc::new(driver);
    let driver: Arc<dyn DatabaseDriver> =
        Arc::clone(&in_memory_test_driver) as Arc<dyn DatabaseDriver>;
    let client = DaoClient::with_driver(driver);
    (in_memory_test_driver, client.dao("users"))
}

fn text(s: &str) -> SqlValue {
    SqlValue::Text(s.to_string())
}

#[tokio::test]
async fn test_find_by_id() {
    let (driver, users) =
        setup(InMemoryTestDriver::new().with_response(user_rows(&[(1, "ann", 30)])));

    let user = users.find_by_id(1).await.unwrap();

    driver.assert_last_query(
        "SELECT * FROM `users` WHERE `id` = ? LIMIT 0,1",
        &[SqlValue::Int32(1)],
    );
    assert_eq!(
        user,
        Some(User {
            id: Some(1),
            user_name: Some("ann".to_string()),
            age: Some(30),
        })
    );
}

#[tokio::test]
async fn test_find_by_id_not_found_is_none() {
    let (driver, users) = setup(InMemoryTestDriver::new());

    assert_eq!(users.find_by_id(404).await.unwrap(), None);
    driver.assert_query_count(1);
}

#[tokio::test]
async fn test_find_all_and_select_fields() {
    let (driver, users) = setup(
        InMemoryTestDriver::new()
            .with_response(user_rows(&[(1, "ann", 30), (2, "bob", 40)]))
            .with_response(user_rows(&[(1, "ann", 30)])),
    );

    let all = users.find_all().await.unwrap();
    assert_eq!(all.len(), 2);
    driver.assert_last_query("SELECT * FROM `users`", &[]);

    users
        .with_select_fields("`id`,`user_name`,`age`")
        .find_all()
        .await
        .unwrap();
    driver.assert_last_query("SELECT `id`,`user_name`,`age` FROM `users`", &[]);
}

#[tokio::test]
async fn test_find_by_id_list_filters_ids() {
    let (driver, users) = setup(InMemoryTestDriver::new().with_response(user_rows(&[(5, "e", 1)])));

    let ids = vec![Some("5"), Some("5"), Some(""), None, Some("drop;table")];
    let found = users.find_by_id_list(ids).await.unwrap();

    driver.assert_query_count(1);
    driver.assert_last_query("SELECT * FROM `users` WHERE `id` IN ('5')", &[]);
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn test_find_by_id_list_all_filtered_issues_no_query() {
    let (driver, users) = setup(InMemoryTestDriver::new());

    let found = users
        .find_by_id_list(vec![None, Some(""), Some("1 OR 1=1"), Some("x'--")])
        .await
        .unwrap();

    assert!(found.is_empty());
    driver.assert_query_count(0);
}

#[tokio::test]
async fn test_find_by_id_list_with_custom_field() {
    let (driver, users) = setup(InMemoryTestDriver::new());

    users
        .find_by_id_list_with(
            "user_name",
            vec!["ann", "bob"],
            &daors::builders::fragment::DefaultIdCharFilter,
        )
        .await
        .unwrap();

    driver.assert_last_query(
        "SELECT * FROM `users` WHERE `user_name` IN ('ann','bob')",
        &[],
    );
}

#[tokio::test]
async fn test_find_by_example_record_drops_nulls() {
    let (driver, users) = setup(InMemoryTestDriver::new());

    let example = User {
        user_name: Some("ann".to_string()),
        age: Some(30),
        ..User::default()
    };
    users.find_by_example(&example).await.unwrap();

    driver.assert_last_query(
        "SELECT * FROM `users` WHERE `user_name` = ? and `age` = ?",
        &[text("ann"), SqlValue::Int32(30)],
    );
}

#[tokio::test]
async fn test_find_by_example_empty_is_unconstrained() {
    let (driver, users) = setup(InMemoryTestDriver::new());

    users.find_by_example(&ColumnMap::new()).await.unwrap();

    driver.assert_last_query("SELECT * FROM `users`", &[]);
}

#[tokio::test]
async fn test_find_page_clamps_and_skips_rows_on_zero_count() {
    let (driver, users) = setup(InMemoryTestDriver::new().with_response(count_of(0)));

    let page = users
        .find_page(-1, -5, WhereClause::none(), "")
        .await
        .unwrap();

    assert_eq!(page.page_no, 0);
    assert_eq!(page.page_size, 30);
    assert_eq!(page.total_count, 0);
    assert!(page.records.is_empty());
    driver.assert_query_count(1);
    driver.assert_last_query("SELECT COUNT(0) FROM `users`", &[]);
}

#[tokio::test]
async fn test_find_page_fetches_window() {
    let (driver, users) = setup(
        InMemoryTestDriver::new()
            .with_response(count_of(25))
            .with_response(user_rows(&[(21, "u", 20), (22, "v", 21)])),
    );

    let clause = WhereClause::raw("`age` > ?", [18]).unwrap();
    let page = users.find_page(2, 10, clause, "`id` DESC").await.unwrap();

    let queries = driver.recorded_queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].sql, "SELECT COUNT(0) FROM `users` WHERE `age` > ?");
    assert_eq!(queries[0].params, vec![SqlValue::Int32(18)]);
    assert_eq!(
        queries[1].sql,
        "SELECT * FROM `users` WHERE `age` > ? ORDER BY `id` DESC LIMIT 20,10"
    );
    assert_eq!(queries[1].params, vec![SqlValue::Int32(18)]);

    assert_eq!(page.total_count, 25);
    assert_eq!(page.page_no, 2);
    assert_eq!(page.page_size, 10);
    assert_eq!(page.records.len(), 2);
}

#[tokio::test]
async fn test_find_page_respects_configured_ceiling() {
    let (driver, users) = setup(
        InMemoryTestDriver::new()
            .with_response(count_of(1))
            .with_response(user_rows(&[(1, "a", 1)])),
    );
    let users = users.with_config(DaoConfig {
        max_page_size: 100,
        ..DaoConfig::default()
    });

    let page = users
        .find_page(0, 5000, WhereClause::none(), "")
        .await
        .unwrap();

    assert_eq!(page.page_size, 100);
    driver.assert_last_query("SELECT * FROM `users` LIMIT 0,100", &[]);
}

#[tokio::test]
async fn test_count_is_coerced_to_i64() {
    let (_driver, users) = setup(
        InMemoryTestDriver::new()
            .with_response(InMemoryTestResponseBuilder::scalar("count", "42"))
            .with_response(InMemoryTestResponseBuilder::scalar("count", 3))
            .with_response(InMemoryTestResponseBuilder::scalar("count", 7.0)),
    );

    assert_eq!(users.count_all().await.unwrap(), 42);
    assert_eq!(users.count_all().await.unwrap(), 3);
    assert_eq!(users.count_all().await.unwrap(), 7);
}

#[tokio::test]
async fn test_exists() {
    let (driver, users) = setup(
        InMemoryTestDriver::new()
            .with_response(count_of(0))
            .with_response(count_of(2)),
    );
    let example = ColumnMap::new().with("user_name", "ann");

    assert!(!users.exists(&example).await.unwrap());
    assert!(users.exists(&example).await.unwrap());
    driver.assert_last_query(
        "SELECT COUNT(0) FROM `users` WHERE `user_name` = ?",
        &[text("ann")],
    );
}

#[tokio::test]
async fn test_empty_values_are_rejected_without_storage_call() {
    let (driver, users) = setup(InMemoryTestDriver::new());

    let insert = users.insert_object(&ColumnMap::new()).await.unwrap();
    let update = users
        .update_by_where(&ColumnMap::new(), WhereClause::eq("id", 1))
        .await
        .unwrap();
    let save = users
        .save_or_update_by_id(&User::default(), 1)
        .await
        .unwrap();

    for result in [insert, update, save] {
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("params is empty"));
        assert_eq!(result.affected_rows, None);
    }
    driver.assert_query_count(0);
}

#[tokio::test]
async fn test_insert_object_from_record() {
    let (driver, users) = setup(InMemoryTestDriver::new().with_affected(1));

    let user = User {
        user_name: Some("ann".to_string()),
        age: Some(30),
        ..User::default()
    };
    let result = users.insert_object(&user).await.unwrap();

    assert!(result.success);
    assert_eq!(result.affected_rows, Some(1));
    driver.assert_last_query(
        "INSERT INTO `users` (`user_name`,`age`) VALUES (?,?)",
        &[text("ann"), SqlValue::Int32(30)],
    );
    assert_eq!(driver.last_query().unwrap().kind, StatementKind::Execute);
}

#[tokio::test]
async fn test_insert_record_with_explicit_projection() {
    let (driver, users) = setup(
        InMemoryTestDriver::new()
            .with_affected(1)
            .with_affected(1),
    );
    let user = User {
        user_name: Some("ann".to_string()),
        ..User::default()
    };

    users.insert_record_with(&user, false, false).await.unwrap();
    driver.assert_last_query(
        "INSERT INTO `users` (`id`,`userName`,`age`) VALUES (?,?,?)",
        &[SqlValue::Null, text("ann"), SqlValue::Null],
    );

    users.insert_record_with(&user, true, true).await.unwrap();
    driver.assert_last_query(
        "INSERT INTO `users` (`user_name`) VALUES (?)",
        &[text("ann")],
    );
}

#[tokio::test]
async fn test_update_binds_set_args_before_where_args() {
    let (driver, users) = setup(InMemoryTestDriver::new().with_affected(1));

    users
        .update_by_id(&ColumnMap::new().with("user_name", "zed"), 7)
        .await
        .unwrap();

    driver.assert_last_query(
        "UPDATE `users` SET `user_name`=? WHERE `id` = ?",
        &[text("zed"), SqlValue::Int32(7)],
    );
}

#[tokio::test]
async fn test_delete_variants() {
    let (driver, users) = setup(
        InMemoryTestDriver::new()
            .with_affected(1)
            .with_affected(3)
            .with_affected(5),
    );

    users.delete_by_id(9).await.unwrap();
    driver.assert_last_query("DELETE FROM `users` WHERE `id` = ?", &[SqlValue::Int32(9)]);

    let result = users
        .delete_by_example(&ColumnMap::new().with("age", 0))
        .await
        .unwrap();
    assert_eq!(result.affected_rows, Some(3));
    driver.assert_last_query("DELETE FROM `users` WHERE `age` = ?", &[SqlValue::Int32(0)]);

    let everything = users.delete_by_example(&User::default()).await.unwrap();
    assert!(everything.success);
    assert_eq!(everything.affected_rows, Some(5));
    driver.assert_last_query("DELETE FROM `users`", &[]);
    driver.assert_query_count(3);
}

#[tokio::test]
async fn test_batch_insert_using_repeat_partial_success() {
    let (driver, users) = setup(
        InMemoryTestDriver::new()
            .with_affected(1)
            .with_error(DaoError::QueryFailed("duplicate key value".to_string()))
            .with_affected(1),
    );
    let rows = vec![
        ColumnMap::new().with("id", 1).with("user_name", "a"),
        ColumnMap::new().with("id", 1).with("user_name", "dup"),
        ColumnMap::new().with("id", 2).with("user_name", "b"),
    ];

    let results = users.batch_insert_using_repeat(&rows).await.unwrap();

    assert_eq!(
        results.iter().map(|r| r.success).collect::<Vec<_>>(),
        vec![true, false, true]
    );
    assert!(results[1]
        .message
        .as_deref()
        .unwrap()
        .contains("duplicate key value"));
    let queries = driver.recorded_queries();
    assert_eq!(queries.len(), 3);
    assert_eq!(queries[0].params, vec![SqlValue::Int32(1), text("a")]);
    assert_eq!(queries[2].params, vec![SqlValue::Int32(2), text("b")]);
}

#[tokio::test]
async fn test_batch_insert_using_repeat_aborts_on_connectivity() {
    let (driver, users) = setup(
        InMemoryTestDriver::new()
            .with_affected(1)
            .with_error(DaoError::ConnectionFailed("connection reset".to_string())),
    );
    let rows = vec![
        ColumnMap::new().with("user_name", "a"),
        ColumnMap::new().with("user_name", "b"),
        ColumnMap::new().with("user_name", "c"),
    ];

    let err = users.batch_insert_using_repeat(&rows).await.unwrap_err();

    assert!(err.is_connectivity());
    driver.assert_query_count(2);
}

#[tokio::test]
async fn test_batch_insert_using_large_sql_unions_columns() {
    let (driver, users) = setup(InMemoryTestDriver::new().with_affected(3));
    let rows = vec![
        ColumnMap::new().with("user_name", "a").with("age", 1),
        ColumnMap::new().with("user_name", "b"),
        ColumnMap::new(),
        ColumnMap::new().with("age", 3).with("id", 9),
    ];

    let result = users.batch_insert_using_large_sql(&rows).await.unwrap();

    assert!(result.success);
    assert_eq!(result.affected_rows, Some(3));
    driver.assert_last_query(
        "INSERT INTO `users` (`user_name`,`age`,`id`) VALUES (?,?,?),(?,?,?),(?,?,?)",
        &[
            text("a"),
            SqlValue::Int32(1),
            SqlValue::Null,
            text("b"),
            SqlValue::Null,
            SqlValue::Null,
            SqlValue::Null,
            SqlValue::Int32(3),
            SqlValue::Int32(9),
        ],
    );
}

#[tokio::test]
async fn test_batch_insert_using_large_sql_is_all_or_nothing() {
    let (driver, users) = setup(
        InMemoryTestDriver::new()
            .with_error(DaoError::QueryFailed("duplicate key value".to_string())),
    );
    let rows = vec![
        ColumnMap::new().with("id", 1),
        ColumnMap::new().with("id", 1),
        ColumnMap::new().with("id", 2),
    ];

    let result = users.batch_insert_using_large_sql(&rows).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.affected_rows, None);
    driver.assert_query_count(1);
}

#[tokio::test]
async fn test_batch_insert_using_large_sql_propagates_connectivity() {
    let (_driver, users) = setup(
        InMemoryTestDriver::new().with_error(DaoError::ConnectionFailed("refused".to_string())),
    );

    let err = users
        .batch_insert_using_large_sql(&[ColumnMap::new().with("id", 1)])
        .await
        .unwrap_err();
    assert!(err.is_connectivity());
}

#[tokio::test]
async fn test_save_or_update_inserts_when_nothing_matches() {
    let (driver, users) = setup(
        InMemoryTestDriver::new()
            .with_response(user_rows(&[]))
            .with_affected(1),
    );
    let values = ColumnMap::new().with("user_name", "ann");

    let result = users
        .save_or_update(&values, WhereClause::eq("user_name", "ann"))
        .await
        .unwrap();

    assert!(result.success);
    let queries = driver.recorded_queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].kind, StatementKind::Query);
    assert_eq!(queries[0].sql, "SELECT * FROM `users` WHERE `user_name` = ?");
    assert_eq!(queries[1].sql, "INSERT INTO `users` (`user_name`) VALUES (?)");
}

#[tokio::test]
async fn test_save_or_update_updates_when_matched() {
    let (driver, users) = setup(
        InMemoryTestDriver::new()
            .with_response(user_rows(&[(4, "ann", 30)]))
            .with_affected(1),
    );

    users
        .save_or_update_by_id(&ColumnMap::new().with("age", 31), 4)
        .await
        .unwrap();

    let queries = driver.recorded_queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].sql, "SELECT * FROM `users` WHERE `id` = ?");
    driver.assert_last_query(
        "UPDATE `users` SET `age`=? WHERE `id` = ?",
        &[SqlValue::Int32(31), SqlValue::Int32(4)],
    );
}

#[tokio::test]
async fn test_by_field_helpers() {
    let (driver, users) = setup(
        InMemoryTestDriver::new()
            .with_response(user_rows(&[(1, "ann", 30)]))
            .with_response(user_rows(&[(1, "ann", 30)]))
            .with_response(count_of(1))
            .with_affected(1)
            .with_affected(1),
    );

    let one = users.find_one_by_field("  user_name ", "ann").await.unwrap();
    assert!(one.is_some());
    driver.assert_last_query(
        "SELECT * FROM `users` WHERE `user_name` = ? LIMIT 0,1",
        &[text("ann")],
    );

    let list = users.find_list_by_field("age", 30).await.unwrap();
    assert_eq!(list.len(), 1);

    assert_eq!(users.count_by_field("age", 30).await.unwrap(), 1);

    users
        .update_by_field(&ColumnMap::new().with("age", 31), "user_name", "ann")
        .await
        .unwrap();
    driver.assert_last_query(
        "UPDATE `users` SET `age`=? WHERE `user_name` = ?",
        &[SqlValue::Int32(31), text("ann")],
    );

    users.delete_by_field("user_name", "ann").await.unwrap();
    driver.assert_query_count(5);
}

#[tokio::test]
async fn test_by_field_rejects_blank_field_name() {
    let (driver, users) = setup(InMemoryTestDriver::new());

    let deleted = users.delete_by_field("   ", 1).await.unwrap();
    assert!(!deleted.success);

    let updated = users
        .update_by_field(&ColumnMap::new().with("age", 1), "", 1)
        .await
        .unwrap();
    assert!(!updated.success);

    assert!(matches!(
        users.count_by_field("", 1).await,
        Err(DaoError::InvalidArgument(_))
    ));
    assert!(matches!(
        users.find_one_by_field(" ", 1).await,
        Err(DaoError::InvalidArgument(_))
    ));
    driver.assert_query_count(0);
}

#[tokio::test]
async fn test_retargeting_returns_new_accessor() {
    let (driver, users) = setup(InMemoryTestDriver::new());
    let archive = users.use_schema("archive").use_table("old_users");

    archive.find_all().await.unwrap();
    driver.assert_last_query("SELECT * FROM `archive`.`old_users`", &[]);

    users.find_all().await.unwrap();
    driver.assert_last_query("SELECT * FROM `users`", &[]);
}

#[tokio::test]
async fn test_row_mapper_survives_retargeting() {
    let (driver, users) = setup(
        InMemoryTestDriver::new()
            .with_response(user_rows(&[(1, "ann", 30)]))
            .with_response(user_rows(&[(2, "bob", 40)])),
    );
    let shouting = users.with_row_mapper(|row| {
        let mut user = User::from_row(row)?;
        user.user_name = user.user_name.map(|name| name.to_uppercase());
        Ok(user)
    });
    let archived = shouting.use_schema("archive").use_table("old_users");

    let current = shouting.find_all().await.unwrap();
    let old = archived.find_all().await.unwrap();

    assert_eq!(current[0].user_name.as_deref(), Some("ANN"));
    assert_eq!(old[0].user_name.as_deref(), Some("BOB"));
    driver.assert_last_query("SELECT * FROM `archive`.`old_users`", &[]);

    // The accessor it was derived from still maps with from_row.
    let plain = users.use_connection(Arc::new(
        InMemoryTestDriver::new().with_response(user_rows(&[(3, "cy", 1)])),
    ));
    assert_eq!(
        plain.find_all().await.unwrap()[0].user_name.as_deref(),
        Some("cy")
    );
}

#[tokio::test]
async fn test_use_connection_switches_driver() {
    let (first, users) = setup(InMemoryTestDriver::new());
    let second = Arc::new(InMemoryTestDriver::new());

    let moved = users.use_connection(Arc::clone(&second) as Arc<dyn DatabaseDriver>);
    moved.find_all().await.unwrap();

    first.assert_query_count(0);
    second.assert_query_count(1);
}

#[tokio::test]
async fn test_mapping_failure_surfaces() {
    let (_driver, users) = setup(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["id", "user_name", "age"])
                .row(vec![text("not a number"), text("ann"), SqlValue::Int32(1)])
                .build(),
        ),
    );

    let err = users.find_all().await.unwrap_err();
    assert!(matches!(err, DaoError::TypeMismatch { ref column, .. } if column == "id"));
}

#[tokio::test]
async fn test_query_failure_propagates_in_single_row_operations() {
    let (_driver, users) = setup(
        InMemoryTestDriver::new()
            .with_error(DaoError::QueryFailed("syntax error".to_string())),
    );

    let err = users
        .insert_object(&ColumnMap::new().with("id", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::QueryFailed(_)));
    assert!(!err.is_connectivity());
}

// Listener

#[derive(Default)]
struct RecordingListener {
    events: Mutex<Vec<DataModifyEvent>>,
}

impl DataModifyListener for RecordingListener {
    fn on_data_modified(&self, event: &DataModifyEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[tokio::test]
async fn test_listener_sees_successful_mutations_only() {
    let (_driver, users) = setup(
        InMemoryTestDriver::new()
            .with_affected(1)
            .with_error(DaoError::QueryFailed("constraint".to_string()))
            .with_affected(4),
    );
    let listener = Arc::new(RecordingListener::default());
    let users = users
        .use_schema("app")
        .with_listener(Arc::clone(&listener) as Arc<dyn DataModifyListener>);

    users
        .insert_object(&ColumnMap::new().with("id", 1))
        .await
        .unwrap();
    assert!(users
        .update_by_id(&ColumnMap::new().with("age", 2), 1)
        .await
        .is_err());
    users.insert_object(&ColumnMap::new()).await.unwrap();
    users.delete_by_where(WhereClause::none()).await.unwrap();

    let events = listener.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            DataModifyEvent {
                table: "`app`.`users`".to_string(),
                kind: ModifyKind::Insert,
                affected_rows: 1,
            },
            DataModifyEvent {
                table: "`app`.`users`".to_string(),
                kind: ModifyKind::Delete,
                affected_rows: 4,
            },
        ]
    );
}

// Connection factory

struct TrackedConnection {
    inner: Arc<InMemoryTestDriver>,
    released: Arc<AtomicUsize>,
}

impl Drop for TrackedConnection {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DatabaseDriver for TrackedConnection {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        self.inner.query(sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        self.inner.execute(sql, params).await
    }
}

struct TrackingFactory {
    driver: Arc<InMemoryTestDriver>,
    acquired: AtomicUsize,
    released: Arc<AtomicUsize>,
}

#[async_trait]
impl ConnectionFactory for TrackingFactory {
    async fn acquire(&self) -> Result<Box<dyn DatabaseDriver>> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackedConnection {
            inner: Arc::clone(&self.driver),
            released: Arc::clone(&self.released),
        }))
    }
}

#[tokio::test]
async fn test_factory_connections_are_released_on_every_path() {
    let driver = Arc::new(
        InMemoryTestDriver::new()
            .with_response(user_rows(&[(1, "ann", 30)]))
            .with_response(InMemoryResponse::Error(DaoError::QueryFailed(
                "boom".to_string(),
            ))),
    );
    let factory = Arc::new(TrackingFactory {
        driver: Arc::clone(&driver),
        acquired: AtomicUsize::new(0),
        released: Arc::new(AtomicUsize::new(0)),
    });
    let client = DaoClient::with_factory(Arc::clone(&factory) as Arc<dyn ConnectionFactory>);
    let users: Dao<User> = client.dao("users");

    assert_eq!(users.find_all().await.unwrap().len(), 1);
    assert!(users.find_all().await.is_err());

    assert_eq!(factory.acquired.load(Ordering::SeqCst), 2);
    assert_eq!(factory.released.load(Ordering::SeqCst), 2);
    driver.assert_query_count(2);
}

#[tokio::test]
async fn test_use_factory_retargets_connection_source() {
    let (direct, users) = setup(InMemoryTestDriver::new());
    let pooled = Arc::new(InMemoryTestDriver::new());
    let factory = Arc::new(TrackingFactory {
        driver: Arc::clone(&pooled),
        acquired: AtomicUsize::new(0),
        released: Arc::new(AtomicUsize::new(0)),
    });

    let users = users.use_factory(Arc::clone(&factory) as Arc<dyn ConnectionFactory>);
    users.count_all().await.unwrap_err();

    direct.assert_query_count(0);
    pooled.assert_query_count(1);
    assert_eq!(factory.released.load(Ordering::SeqCst), 1);
}
