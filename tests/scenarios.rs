use nl_sql::config::EngineConfig;
use nl_sql::{GuardKind, SqlAssistant, SqlOutcome};

const RFAM: &str = r#"{
    "tables": [{
        "name": "family",
        "columns": [
            {"name": "rfam_id", "type": "varchar(20)", "key": "PRI", "isPrimary": true},
            {"name": "rfam_acc", "type": "varchar(7)"}
        ]
    }],
    "dbType": "mysql"
}"#;

const SHOP: &str = r#"{
    "tables": [
        {
            "name": "users",
            "columns": [
                {"name": "id", "type": "int", "key": "PRI", "extra": "auto_increment"},
                {"name": "name", "type": "varchar(100)"},
                {"name": "email", "type": "varchar(255)"}
            ]
        },
        {
            "name": "orders",
            "columns": [
                {"name": "id", "type": "int", "key": "PRI"},
                {"name": "user_id", "type": "int"},
                {"name": "total", "type": "decimal(10,2)"}
            ],
            "foreignKeys": [
                {"columnName": "user_id", "referencedTable": "users", "referencedColumn": "id",
                 "constraintName": "fk_orders_users"}
            ]
        },
        {
            "name": "products",
            "columns": [{"name": "price", "type": "decimal(10,2)"}]
        }
    ],
    "dbType": "mysql"
}"#;

fn assistant(schema: &str) -> SqlAssistant {
    let assistant = SqlAssistant::new(EngineConfig::default());
    assistant.init(schema).unwrap();
    assistant
}

fn sql(assistant: &SqlAssistant, prompt: &str) -> String {
    assistant.generate_sql(prompt).unwrap().to_text()
}

#[test]
fn portuguese_equality_on_named_column() {
    let assistant = assistant(RFAM);
    assert_eq!(
        sql(
            &assistant,
            "selecione a coluna rfam_id da tabela family onde a coluna rfam_acc é igual a 3"
        ),
        "SELECT family.rfam_id FROM family WHERE family.rfam_acc = 3"
    );
}

#[test]
fn portuguese_less_or_equal() {
    let assistant = assistant(RFAM);
    assert_eq!(
        sql(
            &assistant,
            "selecione a coluna rfam_id da tabela family onde a coluna rfam_acc for menor ou igual a 100"
        ),
        "SELECT family.rfam_id FROM family WHERE family.rfam_acc <= 100"
    );
}

#[test]
fn join_follows_the_foreign_key() {
    let assistant = assistant(SHOP);
    let statement = sql(&assistant, "Show me all orders along with customer information");
    assert!(statement.starts_with("SELECT "), "{}", statement);
    assert!(
        statement.contains("FROM orders JOIN users ON orders.user_id = users.id"),
        "{}",
        statement
    );
}

#[test]
fn counting_with_a_filter() {
    let assistant = assistant(SHOP);
    assert_eq!(
        sql(&assistant, "How many products have a price greater than 100"),
        "SELECT COUNT(*) FROM products WHERE products.price > 100"
    );
}

#[test]
fn unconditional_delete_is_guarded() {
    let assistant = assistant(SHOP);
    let outcome = assistant
        .generate_sql("delete the user with no condition specified")
        .unwrap();

    assert!(!outcome.is_sql());
    assert!(matches!(
        &outcome,
        SqlOutcome::Guarded { kind: GuardKind::UnsafeDelete(table), .. } if table == "users"
    ));
    assert!(outcome.to_text().starts_with("-- "));
    assert!(assistant.history().is_empty());
}

#[test]
fn unconditional_update_is_guarded() {
    let assistant = assistant(SHOP);
    let outcome = assistant.generate_sql("update users set name to 'Ann'").unwrap();
    assert!(matches!(
        outcome,
        SqlOutcome::Guarded { kind: GuardKind::UnsafeUpdate(_), .. }
    ));
}

#[test]
fn second_call_is_served_from_cache() {
    let assistant = assistant(SHOP);
    let first = assistant.generate("Show me all orders along with customer information").unwrap();
    let second = assistant.generate("show me all orders along with customer information").unwrap();

    assert_eq!(first.outcome, second.outcome);
    assert!(second.cached);
    assert_eq!(assistant.stats().resolutions, 1);
}

#[test]
fn generation_is_deterministic() {
    let prompts = [
        "How many products have a price greater than 100",
        "Show me all orders along with customer information",
        "list users where name starts with A",
    ];
    for prompt in prompts {
        let a = assistant(SHOP).generate_sql(prompt).unwrap();
        let b = assistant(SHOP).generate_sql(prompt).unwrap();
        assert_eq!(a, b, "{}", prompt);
    }
}

#[test]
fn sqlserver_pagination_uses_offset_fetch() {
    let schema = SHOP.replace(r#""dbType": "mysql""#, r#""dbType": "sqlserver""#);
    let assistant = assistant(&schema);
    let statement = sql(&assistant, "show the first 10 users");

    assert!(!statement.contains("LIMIT"), "{}", statement);
    assert!(
        statement.ends_with("OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"),
        "{}",
        statement
    );
    assert!(statement.contains("ORDER BY users.id"), "{}", statement);
}

#[test]
fn reset_requires_a_new_schema() {
    let assistant = assistant(SHOP);
    sql(&assistant, "show users");
    assistant.reset();

    assert!(assistant.generate_sql("show users").is_err());
    assert!(assistant.history().is_empty());

    assistant.init(SHOP).unwrap();
    assert!(!assistant.generate("show users").unwrap().cached);
}

#[test]
fn feedback_is_correlated_by_sql_text() {
    let assistant = assistant(SHOP);
    let statement = sql(&assistant, "How many products have a price greater than 100");

    let matched = assistant.record_feedback(&nl_sql::QueryFeedback {
        sql: statement,
        was_successful: false,
        error_message: Some("table is locked".to_string()),
        row_count: None,
        execution_time: Some(0.5),
    });
    assert!(matched);

    let entry = &assistant.history()[0];
    assert!(entry.feedback_received);
    assert!(!entry.success);
    assert_eq!(entry.error_message.as_deref(), Some("table is locked"));
    assert_eq!(assistant.success_rate(), Some(0.0));
}

const CRM: &str = r#"{
    "tables": [
        {
            "name": "users",
            "columns": [
                {"name": "id", "type": "int", "key": "PRI"},
                {"name": "name", "type": "varchar(100)"},
                {"name": "age", "type": "int"}
            ]
        },
        {
            "name": "orders",
            "columns": [
                {"name": "id", "type": "int", "key": "PRI"},
                {"name": "user_id", "type": "int"},
                {"name": "status", "type": "varchar(20)"},
                {"name": "total", "type": "decimal(10,2)"}
            ]
        }
    ],
    "dbType": "sqlserver"
}"#;

#[test]
fn sqlserver_grouped_pagination_orders_by_the_group() {
    let assistant = assistant(CRM);
    let statement = sql(&assistant, "count orders per status top 3");

    assert!(
        statement.ends_with(
            "GROUP BY orders.status ORDER BY orders.status OFFSET 0 ROWS FETCH NEXT 3 ROWS ONLY"
        ),
        "{}",
        statement
    );
    assert!(!statement.contains("orders.id"), "{}", statement);
}

#[test]
fn sqlserver_distinct_pagination_orders_by_the_projection() {
    let assistant = assistant(CRM);
    let statement = sql(&assistant, "show distinct name from users top 5");

    assert!(statement.starts_with("SELECT DISTINCT users.name"), "{}", statement);
    assert!(
        statement.ends_with("ORDER BY users.name OFFSET 0 ROWS FETCH NEXT 5 ROWS ONLY"),
        "{}",
        statement
    );
}

#[test]
fn page_numbers_do_not_select_columns() {
    let schema = CRM.replace(r#""dbType": "sqlserver""#, r#""dbType": "mysql""#);
    let assistant = assistant(&schema);
    let statement = sql(&assistant, "show users whose name contains 'ann' page 2");

    assert!(!statement.contains("users.age"), "{}", statement);
    assert!(statement.contains("WHERE users.name LIKE '%ann%'"), "{}", statement);
    assert!(statement.ends_with("LIMIT 100 OFFSET 100"), "{}", statement);
}

#[test]
fn order_by_does_not_pull_in_an_orders_table() {
    let schema = CRM.replace(r#""dbType": "sqlserver""#, r#""dbType": "mysql""#);
    let assistant = assistant(&schema);
    let statement = sql(&assistant, "show users order by name");

    assert!(!statement.contains("JOIN"), "{}", statement);
    assert!(statement.contains("FROM users"), "{}", statement);
    assert!(statement.contains("ORDER BY users.name"), "{}", statement);
}
