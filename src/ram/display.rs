//! RAM 文本表示
//!
//! 以缩进的多行文本打印操作、语句和程序，便于日志和调试输出。
//! 每层嵌套缩进两个空格。

use crate::ram::operation::{Operation, RangePattern};
use crate::ram::program::Program;
use crate::ram::statement::Statement;
use std::fmt::{self, Write};

const INDENT: &str = "  ";

fn write_indent(f: &mut impl Write, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// 范围模式的文本形式，例如 `t0.0 = 3 AND t0.1 >= 5`
///
/// 上下界相同的位置打印为等值，其他位置分别打印存在的界
pub fn format_pattern(tuple_id: usize, pattern: &RangePattern) -> String {
    let mut parts = Vec::new();
    for attribute in 0..pattern.arity() {
        let lower = pattern.lower_bound(attribute);
        let upper = pattern.upper_bound(attribute);
        if lower.is_defined() && lower == upper {
            parts.push(format!("t{}.{} = {}", tuple_id, attribute, lower));
            continue;
        }
        if lower.is_defined() {
            parts.push(format!("t{}.{} >= {}", tuple_id, attribute, lower));
        }
        if upper.is_defined() {
            parts.push(format!("t{}.{} <= {}", tuple_id, attribute, upper));
        }
    }
    parts.join(" AND ")
}

fn write_operation(f: &mut impl Write, op: &Operation, depth: usize) -> fmt::Result {
    write_indent(f, depth)?;
    match op {
        Operation::Scan(scan) => {
            writeln!(f, "FOR t{} IN {}", scan.tuple_id, scan.relation)?;
        }
        Operation::ParallelScan(scan) => {
            writeln!(f, "PARALLEL FOR t{} IN {}", scan.tuple_id, scan.relation)?;
        }
        Operation::IndexScan(scan) => {
            writeln!(
                f,
                "FOR t{} IN {} ON INDEX {}",
                scan.tuple_id,
                scan.relation,
                format_pattern(scan.tuple_id, &scan.pattern)
            )?;
        }
        Operation::ParallelIndexScan(scan) => {
            writeln!(
                f,
                "PARALLEL FOR t{} IN {} ON INDEX {}",
                scan.tuple_id,
                scan.relation,
                format_pattern(scan.tuple_id, &scan.pattern)
            )?;
        }
        Operation::Choice(choice) => {
            writeln!(
                f,
                "CHOICE t{} IN {} WHERE {}",
                choice.tuple_id, choice.relation, choice.condition
            )?;
        }
        Operation::IndexChoice(choice) => {
            writeln!(
                f,
                "CHOICE t{} IN {} ON INDEX {} WHERE {}",
                choice.tuple_id,
                choice.relation,
                format_pattern(choice.tuple_id, &choice.pattern),
                choice.condition
            )?;
        }
        Operation::Aggregate(agg) => {
            write!(f, "t{}.0 = {} ", agg.tuple_id, agg.function)?;
            if agg.function.uses_target_expression() {
                write!(f, "{} ", agg.expression)?;
            }
            writeln!(
                f,
                "FOR ALL t{} IN {} WHERE {}",
                agg.tuple_id, agg.relation, agg.condition
            )?;
        }
        Operation::IndexAggregate(agg) => {
            write!(f, "t{}.0 = {} ", agg.tuple_id, agg.function)?;
            if agg.function.uses_target_expression() {
                write!(f, "{} ", agg.expression)?;
            }
            writeln!(
                f,
                "FOR ALL t{} IN {} ON INDEX {} WHERE {}",
                agg.tuple_id,
                agg.relation,
                format_pattern(agg.tuple_id, &agg.pattern),
                agg.condition
            )?;
        }
        Operation::Filter(filter) => {
            writeln!(f, "IF {}", filter.condition)?;
        }
        Operation::Lookup(lookup) => {
            writeln!(
                f,
                "UNPACK t{} ARITY {} FROM t{}.{}",
                lookup.tuple_id, lookup.arity, lookup.ref_tuple_id, lookup.ref_position
            )?;
        }
        Operation::Project(project) => {
            write!(f, "INSERT ({}) INTO {}", join(&project.values), project.relation)?;
            if let Some(filter) = &project.filter {
                write!(f, " IF NOT IN {}", filter)?;
            }
            writeln!(f)?;
        }
        Operation::Return(ret) => {
            writeln!(f, "RETURN ({})", join(&ret.values))?;
        }
    }

    if let Some(profile) = op.profile_text() {
        if !profile.is_empty() {
            write_indent(f, depth + 1)?;
            writeln!(f, "-- {}", profile)?;
        }
    }

    match op.nested() {
        Some(nested) => write_operation(f, nested, depth + 1),
        None => Ok(()),
    }
}

fn write_statement(f: &mut impl Write, stmt: &Statement, depth: usize) -> fmt::Result {
    match stmt {
        Statement::Sequence(stmts) | Statement::Parallel(stmts) => {
            let keyword = if matches!(stmt, Statement::Sequence(_)) {
                "SEQUENCE"
            } else {
                "PARALLEL"
            };
            write_indent(f, depth)?;
            writeln!(f, "{}", keyword)?;
            for child in stmts {
                write_statement(f, child, depth + 1)?;
            }
            write_indent(f, depth)?;
            writeln!(f, "END {}", keyword)
        }
        Statement::Loop(body) => {
            write_indent(f, depth)?;
            writeln!(f, "LOOP")?;
            write_statement(f, body, depth + 1)?;
            write_indent(f, depth)?;
            writeln!(f, "END LOOP")
        }
        Statement::Exit(cond) => {
            write_indent(f, depth)?;
            writeln!(f, "EXIT {}", cond)
        }
        Statement::Query(query) => {
            write_indent(f, depth)?;
            writeln!(f, "QUERY")?;
            write_operation(f, &query.operation, depth + 1)?;
            write_indent(f, depth)?;
            writeln!(f, "END QUERY")
        }
        Statement::Clear(rel) => {
            write_indent(f, depth)?;
            writeln!(f, "CLEAR {}", rel)
        }
        Statement::Swap(first, second) => {
            write_indent(f, depth)?;
            writeln!(f, "SWAP ({}, {})", first, second)
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_operation(f, self, 0)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_statement(f, self, 0)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PROGRAM")?;
        write_indent(f, 1)?;
        writeln!(f, "DECLARATION")?;
        for relation in self.relations() {
            let attributes: Vec<String> = relation
                .attribute_names()
                .iter()
                .zip(relation.attribute_types())
                .map(|(name, ty)| format!("{}:{}", name, ty))
                .collect();
            write_indent(f, 2)?;
            writeln!(f, "{}({})", relation.name(), attributes.join(","))?;
        }
        write_indent(f, 1)?;
        writeln!(f, "END DECLARATION")?;

        for (name, body) in self.subroutines() {
            write_indent(f, 1)?;
            writeln!(f, "SUBROUTINE {}", name)?;
            write_statement(f, body, 2)?;
            write_indent(f, 1)?;
            writeln!(f, "END SUBROUTINE")?;
        }

        write_indent(f, 1)?;
        writeln!(f, "BEGIN MAIN")?;
        for stmt in self.statements() {
            write_statement(f, stmt, 2)?;
        }
        write_indent(f, 1)?;
        writeln!(f, "END MAIN")?;
        writeln!(f, "END PROGRAM")
    }
}
