use pretty_assertions::assert_eq;
use rstest::rstest;

use schema_migrate::{diff, parse_sql, transform, Column, Schema, Table, TransformWarning};

const SHOP_DDL: &str = r#"
-- shop schema
CREATE TABLE users (
    id SERIAL PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    token UUID DEFAULT gen_random_uuid(),
    created_at TIMESTAMP WITH TIME ZONE DEFAULT now()
);

CREATE TABLE products (
    id INT PRIMARY KEY,
    price NUMERIC(10,2) NOT NULL,
    note TEXT DEFAULT 'fragile; handle with care',
    CHECK (price > 0 AND price < 100)
);

CREATE INDEX idx_products_price ON products (price);
CREATE VIEW cheap_products AS SELECT id FROM products WHERE price < 10;
"#;

fn table(name: &str, columns: &[&str]) -> Table {
    let mut table = Table::new(name);
    for column in columns {
        table.columns.push(Column::new(column, "INT"));
    }
    table
}

fn schema(tables: Vec<Table>) -> Schema {
    Schema {
        tables,
        ..Schema::default()
    }
}

#[test]
fn users_table_is_parsed() {
    let schema = parse_sql(
        "CREATE TABLE users (id SERIAL PRIMARY KEY, email VARCHAR(255) NOT NULL UNIQUE)",
    );

    assert_eq!(schema.tables.len(), 1);
    let users = &schema.tables[0];
    assert_eq!(users.name, "users");
    assert_eq!(users.columns.len(), 2);
    assert_eq!(users.primary_key.as_ref().unwrap().columns, vec!["id"]);

    let email = users.column("email").unwrap();
    assert!(email.is_unique);
    assert!(!email.nullable);
}

#[test]
fn added_column_is_reported() {
    let source = schema(vec![table("users", &["id", "email"])]);
    let target = schema(vec![table("users", &["id", "email", "name"])]);

    let changes = diff(&source, &target);
    assert!(!changes.is_empty());
    assert_eq!(changes.modified_tables.len(), 1);

    let users = &changes.modified_tables[0];
    assert_eq!(users.name, "users");
    let added: Vec<&str> = users.added_columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(added, vec!["name"]);
}

#[rstest]
#[case("mysql", "TINYINT(1)")]
#[case("sqlserver", "BIT")]
fn boolean_column_is_mapped(#[case] target: &str, #[case] expected: &str) {
    let schema = parse_sql("CREATE TABLE flags (enabled BOOLEAN)");
    let result = transform(&schema, "postgres", target).unwrap();
    assert_eq!(result.schema.tables[0].columns[0].data_type, expected);
}

#[test]
fn serial_becomes_auto_increment() {
    let schema = parse_sql("CREATE TABLE users (id SERIAL PRIMARY KEY)");
    let result = transform(&schema, "postgres", "mysql").unwrap();
    assert_eq!(result.schema.tables[0].columns[0].data_type, "INT AUTO_INCREMENT");
}

#[test]
fn uuid_to_mysql_warns_once() {
    let schema = parse_sql("CREATE TABLE sessions (token UUID NOT NULL)");
    let result = transform(&schema, "postgres", "mysql").unwrap();

    let data_loss: Vec<&TransformWarning> = result
        .warnings
        .iter()
        .filter(|w| matches!(w, TransformWarning::DataLoss { .. }))
        .collect();
    assert_eq!(data_loss.len(), 1);

    let message = data_loss[0].to_string();
    assert!(message.contains("sessions"));
    assert!(message.contains("token"));
    assert!(message.contains("no native UUID type"));
}

#[test]
fn diff_of_a_schema_with_itself_is_empty() {
    let shop = parse_sql(SHOP_DDL);
    assert!(!shop.is_empty());
    assert!(diff(&shop, &shop).is_empty());
}

#[test]
fn added_tables_are_removed_in_reverse() {
    let a = parse_sql("CREATE TABLE a (id INT); CREATE TABLE shared (id INT);");
    let b = parse_sql("CREATE TABLE shared (id BIGINT); CREATE TABLE b (id INT); CREATE TABLE c (id INT);");

    let forward = diff(&a, &b);
    let backward = diff(&b, &a);
    assert_eq!(forward.added_tables, backward.removed_tables);
    assert_eq!(forward.removed_tables, backward.added_tables);

    let names: Vec<&str> = forward.added_tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["b", "c"]);
}

#[rstest]
#[case("postgres")]
#[case("mysql")]
#[case("sqlserver")]
fn same_dialect_transform_is_identity(#[case] dialect: &str) {
    let shop = parse_sql(SHOP_DDL);
    let result = transform(&shop, dialect, dialect).unwrap();
    assert_eq!(result.schema, shop);
    assert!(result.warnings.is_empty());
}

#[test]
fn literal_semicolons_do_not_split_statements() {
    let shop = parse_sql(SHOP_DDL);
    assert_eq!(shop.tables.len(), 2);
    assert_eq!(
        shop.table("products").unwrap().column("note").unwrap().default.as_deref(),
        Some("'fragile; handle with care'")
    );
}

#[test]
fn nested_parentheses_stay_in_one_member() {
    let shop = parse_sql(SHOP_DDL);
    let products = shop.table("products").unwrap();

    assert_eq!(products.columns.len(), 3);
    assert_eq!(products.column("price").unwrap().data_type, "NUMERIC(10,2)");
    assert_eq!(products.constraints.len(), 1);
    assert_eq!(
        products.constraints[0].expression.as_deref(),
        Some("price > 0 AND price < 100")
    );
}

#[test]
fn shop_transform_to_sqlserver() {
    let shop = parse_sql(SHOP_DDL);
    let result = transform(&shop, "postgres", "sqlserver").unwrap();
    let users = result.schema.table("users").unwrap();

    assert_eq!(users.column("id").unwrap().data_type, "INT IDENTITY(1,1)");
    assert_eq!(users.column("email").unwrap().data_type, "NVARCHAR(255)");
    assert_eq!(users.column("token").unwrap().data_type, "UNIQUEIDENTIFIER");
    assert_eq!(users.column("token").unwrap().default.as_deref(), Some("NEWID()"));
    assert_eq!(users.column("created_at").unwrap().data_type, "DATETIMEOFFSET");
    assert_eq!(users.column("created_at").unwrap().default.as_deref(), Some("GETDATE()"));

    // only the view needs review
    let messages: Vec<String> = result.warnings.iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        vec!["View 'cheap_products' may contain postgres-specific SQL that requires manual review"]
    );
}
