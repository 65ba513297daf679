//! Tests for SELECT statements.

mod common;
use common::*;

#[test]
fn select_with_where_order_and_limit() {
    let tree = parse("SELECT a, b AS c FROM t WHERE a > 1 ORDER BY b DESC LIMIT 10");
    assert_eq!(tree.count("select_core"), 1);
    assert_eq!(tree.count("select_expr"), 2);
    assert_eq!(tree.count("opt_where"), 1);
    assert_eq!(tree.count("opt_orderby"), 1);
    assert_eq!(tree.count("DESC"), 1);
    assert_eq!(tree.count("LIMIT"), 1);
    assert_eq!(tree.count("COMPARISON"), 1);
}

#[test]
fn select_star_and_qualified_star() {
    parse("SELECT * FROM users");
    let tree = parse("SELECT t.* FROM t");
    assert_eq!(tree.count("'*'"), 1);
    assert_eq!(tree.count("'.'"), 1);
}

#[test]
fn select_aliases() {
    parse("SELECT DISTINCT a AS x, b y, 'lit' AS 'label' FROM t");
}

#[test]
fn select_group_by_with_rollup_and_having() {
    let tree = parse(
        "SELECT t.a, COUNT(*) FROM db.t AS x GROUP BY a DESC WITH ROLLUP HAVING COUNT(*) > 1",
    );
    assert_eq!(tree.count("FCOUNT"), 2);
    assert_eq!(tree.count("opt_with_rollup"), 1);
    assert_eq!(tree.count("ROLLUP"), 1);
    assert_eq!(tree.count("opt_having"), 1);
}

#[test]
fn select_limit_forms() {
    let tree = parse("SELECT a FROM t LIMIT 5, 10");
    assert_eq!(tree.count("INTNUM"), 2);
    let tree = parse("SELECT a FROM t LIMIT 10 OFFSET 5");
    assert_eq!(tree.count("OFFSET"), 1);
}

#[test]
fn select_options() {
    let tree = parse("SELECT DISTINCT HIGH_PRIORITY SQL_CALC_FOUND_ROWS a FROM t");
    assert_eq!(tree.count("DISTINCT"), 1);
    assert_eq!(tree.count("HIGH_PRIORITY"), 1);
    assert_eq!(tree.count("SQL_CALC_FOUND_ROWS"), 1);
}

#[test]
fn select_into_targets() {
    let tree = parse("SELECT a, b INTO @x, @y FROM t");
    assert_eq!(tree.count("USERVAR"), 2);
    let tree = parse("SELECT a INTO OUTFILE 'out.txt' FROM t");
    assert_eq!(tree.count("OUTFILE"), 1);
    assert_eq!(tree.count("STRING"), 1);
}

#[test]
fn select_union_chain() {
    let tree = parse("SELECT a FROM t UNION ALL SELECT b FROM u UNION SELECT c FROM v");
    assert_eq!(tree.count("select_core"), 3);
    assert_eq!(tree.count("UNION"), 2);
    assert_eq!(tree.count("ALL"), 1);
}

#[test]
fn select_joins() {
    let tree = parse(
        "SELECT * FROM a JOIN b ON a.id = b.id LEFT OUTER JOIN c USING (id, k) \
         NATURAL JOIN d, e CROSS JOIN f",
    );
    assert_eq!(tree.count("join_table"), 4);
    assert_eq!(tree.count("table_factor"), 6);
    assert_eq!(tree.count("USING"), 1);
    assert_eq!(tree.count("NATURAL"), 1);
    assert_eq!(tree.count("CROSS"), 1);

    parse("SELECT * FROM a INNER JOIN b USING (id)");
    parse("SELECT * FROM a RIGHT JOIN b ON a.x = b.x");
    parse("SELECT * FROM a NATURAL LEFT OUTER JOIN b");
    let tree = parse("SELECT * FROM (a JOIN b ON a.x = b.x) STRAIGHT_JOIN c ON c.y = a.y");
    assert_eq!(tree.count("join_table"), 2);
    assert_eq!(tree.count("STRAIGHT_JOIN"), 1);
}

#[test]
fn select_index_hints() {
    let tree = parse("SELECT * FROM t USE INDEX (i1, i2) IGNORE KEY (k) FORCE INDEX FOR JOIN (i)");
    assert_eq!(tree.count("index_hint"), 3);
}

#[test]
fn select_subqueries() {
    let tree = parse("SELECT x.a FROM (SELECT a FROM t) AS x WHERE x.a IN (SELECT b FROM u)");
    assert_eq!(tree.count("select_core"), 3);
    assert_eq!(tree.count("table_factor"), 3);
    parse("SELECT (SELECT MAX(a) FROM t) AS m");
}

#[test]
fn statement_lists() {
    assert_eq!(parse("SELECT 1; SELECT 2;").count("select_stmt"), 2);
    parse(";;");
    assert_eq!(parse("").count("stmt"), 0);
}
