//! Canonical AST → SQL formatter (spec.md §4.8).
//!
//! Output is deterministic: keywords upper-case, string literals
//! single-quoted, `NULL` spelled out explicitly, identifiers kept exactly
//! as the source/AST wrote them, commas followed by one space, operators
//! padded with one space on each side. Column order follows the order the
//! `Vec<ColumnDefinition>` was built in (spec.md §6 "Open Question: column
//! order").

use crate::ast::*;
use crate::types::IcebergType;
use std::fmt::Write as _;

pub fn format_statement(stmt: &Statement) -> String {
    match stmt {
        Statement::CreateDatabase(s) => format_create_database(s),
        Statement::DropDatabase(s) => format_drop_database(s),
        Statement::Use(s) => format!("USE {}", s.database),
        Statement::CreateTable(s) => format_create_table(s),
        Statement::DropTable(s) => format_drop_table(s),
        Statement::AlterTable(s) => format_alter_table(s),
        Statement::CreateIndex(s) => format_create_index(s),
        Statement::DropIndex(s) => format!(
            "DROP INDEX {} ON {}",
            s.name,
            format_table_identifier(&s.table_name)
        ),
        Statement::CreateUser(s) => format!("CREATE USER {} IDENTIFIED BY '{}'", s.name, s.password),
        Statement::DropUser(s) => format!("DROP USER {}", s.name),
        Statement::AlterUser(s) => format_alter_user(s),
        Statement::CreateProcedure(s) => {
            format!("CREATE PROCEDURE {}() BEGIN {} END", s.name, s.body)
        }
        Statement::DropProcedure(s) => format!("DROP PROCEDURE {}", s.name),
        Statement::Select(s) => format_select(s),
        Statement::Insert(s) => format_insert(s),
        Statement::Update(s) => format_update(s),
        Statement::Delete(s) => format_delete(s),
        Statement::Begin => "BEGIN".to_string(),
        Statement::Commit => "COMMIT".to_string(),
        Statement::Rollback => "ROLLBACK".to_string(),
        Statement::Grant(s) => format_grant(s),
        Statement::Revoke(s) => format_revoke(s),
        Statement::Show(s) => format_show(s),
        Statement::Declare(s) => format!(
            "DECLARE {} CURSOR FOR {}",
            s.cursor_name,
            format_select(&s.for_select)
        ),
        Statement::Open(s) => format!("OPEN {}", s.cursor_name),
        Statement::Close(s) => format!("CLOSE {}", s.cursor_name),
        Statement::Deallocate(s) => format!("DEALLOCATE {}", s.cursor_name),
        Statement::Fetch(s) => format!(
            "FETCH NEXT FROM {} INTO @{}",
            s.cursor_name, s.into_variable
        ),
        Statement::While(s) => format_while(s),
        Statement::Print(s) => format!("PRINT {}", format_expression(&s.expr)),
        Statement::Exec(s) => format!("EXEC {}", s.name),
        Statement::Explain(s) => format!("EXPLAIN {}", format_statement(&s.statement)),
    }
}

fn format_table_identifier(t: &TableIdentifier) -> String {
    match &t.database {
        Some(db) => format!("{db}.{}", t.table),
        None => t.table.clone(),
    }
}

fn format_scalar_value(v: &ScalarValue) -> String {
    match v {
        ScalarValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        ScalarValue::Int(n) => n.to_string(),
        ScalarValue::Float(n) => n.to_string(),
        ScalarValue::Str(s) => format!("'{}'", s.replace('\'', "\\'")),
    }
}

fn format_default_value(v: &DefaultValue) -> String {
    match v {
        DefaultValue::Literal(v) => format_scalar_value(v),
        DefaultValue::SysDate => "SYSDATE".to_string(),
        DefaultValue::SysTime => "SYSTIME".to_string(),
        DefaultValue::SysTimestamp => "SYSTIMESTAMP".to_string(),
        DefaultValue::GenUuid => "GENUUID".to_string(),
    }
}

fn format_data_type(t: &IcebergType) -> String {
    t.to_string()
}

fn format_column_definition(c: &ColumnDefinition) -> String {
    let mut out = format!("{} {}", c.name, format_data_type(&c.data_type));
    if c.not_null {
        out.push_str(" NOT NULL");
    } else {
        out.push_str(" NULL");
    }
    if c.unique {
        out.push_str(" UNIQUE");
    }
    if c.sequence {
        out.push_str(" SEQUENCE");
    }
    if let Some(default) = &c.default_value {
        let _ = write!(out, " DEFAULT {}", format_default_value(default));
    }
    if let Some(reference) = &c.reference {
        let _ = write!(
            out,
            " REFERENCES {}({})",
            format_table_identifier(&reference.ref_table),
            reference.ref_column
        );
    }
    if let Some(check) = &c.check {
        let _ = write!(out, " CHECK ({})", format_expression(check));
    }
    if c.compress {
        out.push_str(" COMPRESS");
    }
    if let Some(key) = &c.encrypt_key {
        let _ = write!(out, " ENCRYPT KEY '{key}'");
    }
    out
}

fn format_create_database(s: &CreateDatabaseStmt) -> String {
    let mut out = "CREATE DATABASE".to_string();
    if s.if_not_exists {
        out.push_str(" IF NOT EXISTS");
    }
    let _ = write!(out, " {}", s.name);
    out
}

fn format_drop_database(s: &DropDatabaseStmt) -> String {
    let mut out = "DROP DATABASE".to_string();
    if s.if_exists {
        out.push_str(" IF EXISTS");
    }
    let _ = write!(out, " {}", s.name);
    out
}

fn format_create_table(s: &CreateTableStmt) -> String {
    let mut out = "CREATE TABLE".to_string();
    if s.if_not_exists {
        out.push_str(" IF NOT EXISTS");
    }
    let _ = write!(out, " {} (", format_table_identifier(&s.table_name));
    let cols: Vec<String> = s.table_schema.iter().map(format_column_definition).collect();
    out.push_str(&cols.join(", "));
    out.push(')');
    let _ = write!(out, " STORAGE {}", s.storage_engine.as_str());
    if !s.partition_by.is_empty() {
        let _ = write!(out, " PARTITION BY ({})", s.partition_by.join(", "));
    }
    if !s.order_by.is_empty() {
        let _ = write!(out, " ORDER BY ({})", s.order_by.join(", "));
    }
    if !s.settings.is_empty() {
        let mut keys: Vec<&String> = s.settings.keys().collect();
        keys.sort();
        let pairs: Vec<String> = keys
            .into_iter()
            .map(|k| format!("{k} = {}", format_scalar_value(&s.settings[k])))
            .collect();
        let _ = write!(out, " SETTINGS {}", pairs.join(", "));
    }
    if s.compress {
        out.push_str(" COMPRESS");
    }
    if s.encrypt {
        out.push_str(" ENCRYPT");
        if let Some(key) = &s.encrypt_key {
            let _ = write!(out, " KEY '{key}'");
        }
    }
    out
}

fn format_drop_table(s: &DropTableStmt) -> String {
    let mut out = "DROP TABLE".to_string();
    if s.if_exists {
        out.push_str(" IF EXISTS");
    }
    let _ = write!(out, " {}", format_table_identifier(&s.table_name));
    out
}

fn format_alter_table(s: &AlterTableStmt) -> String {
    let mut out = format!("ALTER TABLE {}", format_table_identifier(&s.table_name));
    match &s.action {
        AlterTableAction::DropColumn(col) => {
            let _ = write!(out, " DROP COLUMN {col}");
        }
        AlterTableAction::AlterColumn(col) => {
            let _ = write!(out, " ALTER COLUMN {}", format_column_definition(col));
        }
        AlterTableAction::Settings(settings) => {
            let mut keys: Vec<&String> = settings.keys().collect();
            keys.sort();
            let pairs: Vec<String> = keys
                .into_iter()
                .map(|k| format!("{k} = {}", format_scalar_value(&settings[k])))
                .collect();
            let _ = write!(out, " SETTINGS {}", pairs.join(", "));
        }
    }
    out
}

fn format_create_index(s: &CreateIndexStmt) -> String {
    let kw = if s.unique { "CREATE UNIQUE INDEX" } else { "CREATE INDEX" };
    format!(
        "{kw} {} ON {} ({})",
        s.name,
        format_table_identifier(&s.table_name),
        s.columns.join(", ")
    )
}

fn format_alter_user(s: &AlterUserStmt) -> String {
    match &s.action {
        AlterUserAction::SetPassword(p) => format!("ALTER USER {} SET PASSWORD '{p}'", s.name),
        AlterUserAction::SetUsername(u) => format!("ALTER USER {} SET USERNAME {u}", s.name),
    }
}

fn format_while(s: &WhileStmt) -> String {
    let mut out = format!("WHILE {} BEGIN ", format_expression(&s.condition));
    for stmt in &s.body {
        let _ = write!(out, "{}; ", format_statement(stmt));
    }
    out.push_str("END");
    out
}

fn format_grant(s: &GrantStmt) -> String {
    format!(
        "GRANT {} ON {} TO {}",
        format_privilege_list(&s.privileges),
        format_grant_target(&s.target),
        s.user
    )
}

fn format_revoke(s: &RevokeStmt) -> String {
    format!(
        "REVOKE {} ON {} FROM {}",
        format_privilege_list(&s.privileges),
        format_grant_target(&s.target),
        s.user
    )
}

fn format_privilege_list(privileges: &[Privilege]) -> String {
    privileges
        .iter()
        .map(format_privilege)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_privilege(p: &Privilege) -> String {
    match p {
        Privilege::Select => "SELECT",
        Privilege::Insert => "INSERT",
        Privilege::Update => "UPDATE",
        Privilege::Delete => "DELETE",
        Privilege::All => "ALL",
        Privilege::Drop => "DROP",
        Privilege::Create => "CREATE",
        Privilege::Connect => "CONNECT",
        Privilege::Alter => "ALTER",
        Privilege::Revoke => "REVOKE",
        Privilege::Grant => "GRANT",
        Privilege::Show => "SHOW",
        Privilege::Exec => "EXEC",
        Privilege::Explain => "EXPLAIN",
        Privilege::Print => "PRINT",
        Privilege::Declare => "DECLARE",
        Privilege::Open => "OPEN",
        Privilege::Close => "CLOSE",
        Privilege::Deallocate => "DEALLOCATE",
        Privilege::Fetch => "FETCH",
        Privilege::While => "WHILE",
        Privilege::Return => "RETURN",
        Privilege::Break => "BREAK",
        Privilege::Set => "SET",
        Privilege::Exit => "EXIT",
        Privilege::Begin => "BEGIN",
        Privilege::Commit => "COMMIT",
        Privilege::Rollback => "ROLLBACK",
    }
    .to_string()
}

fn format_grant_target(t: &GrantTarget) -> String {
    match t {
        GrantTarget::Table(table) => format_table_identifier(table),
        GrantTarget::AllInDatabase(db) => format!("DATABASE {db}"),
    }
}

fn format_show(s: &ShowStmt) -> String {
    match s {
        ShowStmt::Databases => "SHOW DATABASES".to_string(),
        ShowStmt::Tables { from } => match from {
            Some(db) => format!("SHOW TABLES FROM {db}"),
            None => "SHOW TABLES".to_string(),
        },
        ShowStmt::Users => "SHOW USERS".to_string(),
        ShowStmt::Indexes { table } => format!("SHOW INDEXES FROM {}", format_table_identifier(table)),
        ShowStmt::Columns { table } => format!("SHOW COLUMNS FROM {}", format_table_identifier(table)),
        ShowStmt::CreateTable { table } => {
            format!("SHOW CREATE TABLE {}", format_table_identifier(table))
        }
        ShowStmt::Grants { user } => match user {
            Some(u) => format!("SHOW GRANTS FOR {u}"),
            None => "SHOW GRANTS".to_string(),
        },
    }
}

fn format_select(s: &SelectStmt) -> String {
    let mut out = "SELECT".to_string();
    if s.distinct {
        out.push_str(" DISTINCT");
    }
    let cols: Vec<String> = s.columns.iter().map(format_expression).collect();
    let _ = write!(out, " {}", cols.join(", "));

    if !s.from.is_empty() {
        let tables: Vec<String> = s.from.iter().map(format_table_ref).collect();
        let _ = write!(out, " FROM {}", tables.join(", "));
    }
    for join in &s.joins {
        let kw = match join.kind {
            JoinKind::Inner => "JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
        };
        let _ = write!(
            out,
            " {kw} {} ON {}",
            format_table_ref(&join.table),
            format_expression(&join.on)
        );
    }
    if let Some(where_clause) = &s.where_clause {
        let _ = write!(out, " WHERE {}", format_expression(where_clause));
    }
    if !s.group_by.is_empty() {
        let cols: Vec<String> = s.group_by.iter().map(format_expression).collect();
        let _ = write!(out, " GROUP BY {}", cols.join(", "));
    }
    if let Some(having) = &s.having {
        let _ = write!(out, " HAVING {}", format_expression(having));
    }
    if !s.order_by.is_empty() {
        let _ = write!(out, " ORDER BY {}", format_order_by_list(&s.order_by));
    }
    if let Some(limit) = s.limit {
        let _ = write!(out, " LIMIT {limit}");
    }
    if let Some(offset) = s.offset {
        let _ = write!(out, " OFFSET {offset}");
    }
    if let Some(union) = &s.union {
        let kw = if union.all { "UNION ALL" } else { "UNION" };
        let _ = write!(out, " {kw} {}", format_select(&union.select));
    }
    out
}

fn format_table_ref(t: &TableRef) -> String {
    match &t.alias {
        Some(alias) => format!("{} {alias}", format_table_identifier(&t.name)),
        None => format_table_identifier(&t.name),
    }
}

fn format_order_by_list(items: &[(Expression, SortDirection)]) -> String {
    items
        .iter()
        .map(|(expr, dir)| {
            let dir_str = match dir {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            format!("{} {dir_str}", format_expression(expr))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_insert(s: &InsertStmt) -> String {
    let mut out = format!("INSERT INTO {}", format_table_identifier(&s.table_name));
    if !s.columns.is_empty() {
        let _ = write!(out, " ({})", s.columns.join(", "));
    }
    let rows: Vec<String> = s
        .values
        .iter()
        .map(|row| {
            let items: Vec<String> = row.iter().map(format_expression).collect();
            format!("({})", items.join(", "))
        })
        .collect();
    let _ = write!(out, " VALUES {}", rows.join(", "));
    out
}

fn format_update(s: &UpdateStmt) -> String {
    let mut out = format!("UPDATE {} SET ", format_table_identifier(&s.table_name));
    let assigns: Vec<String> = s
        .assignments
        .iter()
        .map(|(col, expr)| format!("{col} = {}", format_expression(expr)))
        .collect();
    out.push_str(&assigns.join(", "));
    if let Some(where_clause) = &s.where_clause {
        let _ = write!(out, " WHERE {}", format_expression(where_clause));
    }
    out
}

fn format_delete(s: &DeleteStmt) -> String {
    let mut out = format!("DELETE FROM {}", format_table_identifier(&s.table_name));
    if let Some(where_clause) = &s.where_clause {
        let _ = write!(out, " WHERE {}", format_expression(where_clause));
    }
    out
}

pub fn format_expression(e: &Expression) -> String {
    match e {
        Expression::Identifier { name, .. } => name.clone(),
        Expression::Literal { value, .. } => format_scalar_value(value),
        Expression::Wildcard { .. } => "*".to_string(),
        Expression::Variable { name, .. } => format!("@{name}"),
        Expression::ColumnSpecification { table, column, .. } => match table {
            Some(t) => format!("{t}.{column}"),
            None => column.clone(),
        },
        Expression::BinaryExpression { left, op, right } => {
            let op_str = match op {
                BinaryOp::Add => "+",
                BinaryOp::Sub => "-",
                BinaryOp::Mul => "*",
                BinaryOp::Div => "/",
                BinaryOp::Mod => "%",
            };
            format!(
                "{} {op_str} {}",
                format_expression(left),
                format_expression(right)
            )
        }
        Expression::UnaryExpr { op, operand } => {
            let op_str = match op {
                UnaryOp::Neg => "-",
                UnaryOp::Plus => "+",
            };
            format!("{op_str}{}", format_expression(operand))
        }
        Expression::ComparisonPredicate { left, op, right } => {
            let op_str = match op {
                CompareOp::Eq => "=",
                CompareOp::NotEq => "<>",
                CompareOp::Lt => "<",
                CompareOp::LtEq => "<=",
                CompareOp::Gt => ">",
                CompareOp::GtEq => ">=",
            };
            format!(
                "{} {op_str} {}",
                format_expression(left),
                format_expression(right)
            )
        }
        Expression::LogicalCondition { left, op, right } => {
            let op_str = match op {
                LogicalOp::And => "AND",
                LogicalOp::Or => "OR",
            };
            format!(
                "{} {op_str} {}",
                format_expression(left),
                format_expression(right)
            )
        }
        Expression::NotExpr(inner) => format!("NOT {}", format_expression(inner)),
        Expression::BetweenPredicate {
            expr,
            negated,
            lower,
            upper,
        } => {
            let kw = if *negated { "NOT BETWEEN" } else { "BETWEEN" };
            format!(
                "{} {kw} {} AND {}",
                format_expression(expr),
                format_expression(lower),
                format_expression(upper)
            )
        }
        Expression::InPredicate {
            expr,
            negated,
            list,
            subquery,
        } => {
            let kw = if *negated { "NOT IN" } else { "IN" };
            let inner = if let Some(subquery) = subquery {
                format_select(subquery)
            } else {
                list.iter().map(format_expression).collect::<Vec<_>>().join(", ")
            };
            format!("{} {kw} ({inner})", format_expression(expr))
        }
        Expression::LikePredicate {
            expr,
            negated,
            pattern,
        } => {
            let kw = if *negated { "NOT LIKE" } else { "LIKE" };
            format!("{} {kw} {}", format_expression(expr), format_expression(pattern))
        }
        Expression::IsPredicate { expr, negated } => {
            let kw = if *negated { "IS NOT NULL" } else { "IS NULL" };
            format!("{} {kw}", format_expression(expr))
        }
        Expression::ExistsPredicate { negated, subquery } => {
            let kw = if *negated { "NOT EXISTS" } else { "EXISTS" };
            format!("{kw} ({})", format_select(subquery))
        }
        Expression::CaseExpr {
            operand,
            when_clauses,
            else_clause,
        } => {
            let mut out = "CASE".to_string();
            if let Some(operand) = operand {
                let _ = write!(out, " {}", format_expression(operand));
            }
            for when in when_clauses {
                let _ = write!(
                    out,
                    " WHEN {} THEN {}",
                    format_expression(&when.condition),
                    format_expression(&when.result)
                );
            }
            if let Some(else_clause) = else_clause {
                let _ = write!(out, " ELSE {}", format_expression(else_clause));
            }
            out.push_str(" END");
            out
        }
        Expression::AggregateFunc {
            kind,
            distinct,
            arg,
            window,
        } => {
            let kw = match kind {
                AggregateKind::Count => "COUNT",
                AggregateKind::Sum => "SUM",
                AggregateKind::Avg => "AVG",
                AggregateKind::Min => "MIN",
                AggregateKind::Max => "MAX",
            };
            let arg_str = match arg {
                Some(expr) => format_expression(expr),
                None => "*".to_string(),
            };
            let distinct_str = if *distinct { "DISTINCT " } else { "" };
            let mut out = format!("{kw}({distinct_str}{arg_str})");
            if let Some(window) = window {
                out.push_str(" OVER (");
                let mut parts = Vec::new();
                if !window.partition_by.is_empty() {
                    parts.push(format!(
                        "PARTITION BY {}",
                        window
                            .partition_by
                            .iter()
                            .map(format_expression)
                            .collect::<Vec<_>>()
                            .join(", ")
                    ));
                }
                if !window.order_by.is_empty() {
                    parts.push(format!("ORDER BY {}", format_order_by_list(&window.order_by)));
                }
                out.push_str(&parts.join(" "));
                out.push(')');
            }
            out
        }
        Expression::SystemFunc(f) => format_system_func(f),
        Expression::SysDate => "SYSDATE".to_string(),
        Expression::SysTime => "SYSTIME".to_string(),
        Expression::SysTimestamp => "SYSTIMESTAMP".to_string(),
        Expression::GenUuid => "GENUUID".to_string(),
        Expression::Subquery(select) => format!("({})", format_select(select)),
    }
}

fn format_system_func(f: &SystemFunc) -> String {
    match f {
        SystemFunc::Upper(e) => format!("UPPER({})", format_expression(e)),
        SystemFunc::Lower(e) => format!("LOWER({})", format_expression(e)),
        SystemFunc::Cast { expr, data_type } => {
            format!("CAST({} AS {})", format_expression(expr), format_data_type(data_type))
        }
        SystemFunc::Coalesce(args) => format!(
            "COALESCE({})",
            args.iter().map(format_expression).collect::<Vec<_>>().join(", ")
        ),
        SystemFunc::Reverse(e) => format!("REVERSE({})", format_expression(e)),
        SystemFunc::Round { expr, digits } => match digits {
            Some(d) => format!("ROUND({}, {})", format_expression(expr), format_expression(d)),
            None => format!("ROUND({})", format_expression(expr)),
        },
        SystemFunc::Position { needle, haystack } => format!(
            "POSITION({} IN {})",
            format_expression(needle),
            format_expression(haystack)
        ),
        SystemFunc::Length(e) => format!("LENGTH({})", format_expression(e)),
        SystemFunc::Replace {
            expr,
            pattern,
            replacement,
        } => format!(
            "REPLACE({}, {}, {})",
            format_expression(expr),
            format_expression(pattern),
            format_expression(replacement)
        ),
        SystemFunc::Concat(args) => format!(
            "CONCAT({})",
            args.iter().map(format_expression).collect::<Vec<_>>().join(", ")
        ),
        SystemFunc::Substring { expr, start, length } => match length {
            Some(l) => format!(
                "SUBSTRING({}, {}, {})",
                format_expression(expr),
                format_expression(start),
                format_expression(l)
            ),
            None => format!("SUBSTRING({}, {})", format_expression(expr), format_expression(start)),
        },
        SystemFunc::Trim(e) => format!("TRIM({})", format_expression(e)),
    }
}
