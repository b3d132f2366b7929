use pretty_assertions::assert_eq;
use rstest::rstest;

use schema_migrate::{generate_sql, parse_sql, transform, Dialect, SqlGenerator};

const BLOG_DDL: &str = r#"
CREATE TABLE users (
    id SERIAL PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    active BOOLEAN DEFAULT TRUE,
    created_at TIMESTAMP WITH TIME ZONE DEFAULT now() NOT NULL
);

CREATE TABLE posts (
    id BIGINT GENERATED BY DEFAULT AS IDENTITY,
    user_id INT NOT NULL,
    title TEXT,
    CONSTRAINT pk_posts PRIMARY KEY (id),
    CONSTRAINT fk_posts_user FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE,
    CHECK (length(title) > 0)
);

CREATE UNIQUE INDEX idx_posts_title ON posts USING btree (title);
CREATE VIEW recent_posts AS SELECT id, title FROM posts;
"#;

#[test]
fn postgres_ddl_round_trips() {
    let schema = parse_sql(BLOG_DDL);
    let generated = generate_sql(&schema, "postgres").unwrap();
    let reparsed = parse_sql(&generated);

    assert_eq!(reparsed, schema);
}

#[test]
fn generated_ddl_is_stable() {
    let schema = parse_sql(BLOG_DDL);
    let once = SqlGenerator::new(Dialect::Postgres).generate(&schema);
    let twice = SqlGenerator::new(Dialect::Postgres).generate(&parse_sql(&once));
    assert_eq!(once, twice);
}

#[rstest]
#[case("mysql")]
#[case("sqlserver")]
fn identity_and_keys_survive_other_dialects(#[case] dialect: &str) {
    let schema = parse_sql(BLOG_DDL);
    let converted = transform(&schema, "postgres", dialect).unwrap().schema;
    let reparsed = parse_sql(&generate_sql(&converted, dialect).unwrap());

    assert_eq!(reparsed.tables.len(), 2);
    for (original, back) in converted.tables.iter().zip(&reparsed.tables) {
        assert_eq!(back.name, original.name);
        assert_eq!(back.primary_key, original.primary_key);
        assert_eq!(back.foreign_keys, original.foreign_keys);
        assert_eq!(back.constraints, original.constraints);

        let names: Vec<&str> = back.columns.iter().map(|c| c.name.as_str()).collect();
        let expected: Vec<&str> = original.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, expected);

        for (a, b) in original.columns.iter().zip(&back.columns) {
            assert_eq!(b.is_identity, a.is_identity, "{}.{}", original.name, a.name);
            assert_eq!(b.nullable, a.nullable, "{}.{}", original.name, a.name);
            assert_eq!(b.default, a.default, "{}.{}", original.name, a.name);
        }
    }

    assert_eq!(reparsed.indexes.len(), 1);
    assert_eq!(reparsed.indexes[0].columns, vec!["title"]);
    assert!(reparsed.indexes[0].is_unique);
    assert_eq!(reparsed.views, converted.views);
}
