//! 转换流水线集成测试
//!
//! 测试范围:
//! - transform::pipeline - 按配置运行转换
//! - validate - 流水线前后的程序校验
//! - display / JSON - 优化后程序的输出

mod common;

use common::assertions::{assert_err_with, assert_no_empty_index, operation_names};
use common::data_fixtures::{insert_s, pattern, program_with, rel};
use common::FixedIndexAnalysis;
use ramlog::config::OptimizerConfig;
use ramlog::core::BinaryConstraintOp;
use ramlog::ram::operation::{IndexScan, Project, Scan};
use ramlog::ram::{
    Condition, Expression, IndexedInequalityTransformer, Program, ProgramValidator, RangePattern,
    Relation, RelationReference, RemoveEmptyIndexTransformer, StaticIndexAnalysis, Statement,
    TransformPipeline,
};

/// 半朴素求值的传递闭包：
/// path(x, y) :- edge(x, y).
/// path(x, z) :- path(x, y), edge(y, z), z < 100.
fn transitive_closure() -> Program {
    let mut program = Program::new();
    let edge = program.add_relation(Relation::new("edge", 2));
    let path = program.add_relation(Relation::new("path", 2));
    let delta = program.add_relation(Relation::new("@delta_path", 2));
    let new = program.add_relation(Relation::new("@new_path", 2));

    let copy_edges = Statement::query(
        Scan::new(
            edge.clone(),
            0,
            Project::new(
                path.clone(),
                vec![Expression::tuple_element(0, 0), Expression::tuple_element(0, 1)],
            )
            .into(),
            "@frequency-atom;edge",
        )
        .into(),
    );

    // edge 上按 t0.1 等值查找，并带有 z < 100 的上界
    let mut join_pattern = RangePattern::unbounded(2);
    join_pattern.set_bounds(0, Expression::tuple_element(0, 1), Expression::tuple_element(0, 1));
    join_pattern.set_bounds(1, Expression::Undefined, Expression::signed(99));

    let join = Statement::query(
        Scan::new(
            delta.clone(),
            0,
            IndexScan::new(
                edge,
                1,
                join_pattern,
                Project::new(
                    new.clone(),
                    vec![Expression::tuple_element(0, 0), Expression::tuple_element(1, 1)],
                )
                .with_filter(path.clone())
                .into(),
                "@frequency-atom;path",
            )
            .into(),
            "",
        )
        .into(),
    );

    program.add_statement(copy_edges);
    program.add_statement(Statement::looped(Statement::sequence(vec![
        join,
        Statement::Exit(Condition::EmptinessCheck(new.clone())),
        Statement::Swap(delta.clone(), new.clone()),
        Statement::Clear(new),
    ])));
    program.add_statement(Statement::Clear(delta));
    program
}

#[test]
fn test_pipeline_on_transitive_closure() {
    // edge 只有索引 [0]：属性 1 的上界必须卸载
    let analysis = StaticIndexAnalysis::new().with_index("edge", vec![0]);
    let mut pipeline = TransformPipeline::with_index_passes(&analysis, OptimizerConfig::default());

    let mut program = transitive_closure();
    assert!(pipeline.run(&mut program).expect("流水线失败"));
    assert_no_empty_index(&program);

    let queries = program.queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(operation_names(queries[0].operation()), vec!["Scan", "Project"]);
    assert_eq!(
        operation_names(queries[1].operation()),
        vec!["Scan", "IndexScan", "Filter", "Project"]
    );

    let text = program.to_string();
    assert!(
        text.contains("FOR t1 IN edge ON INDEX t1.0 = t0.1"),
        "输出中应保留等值索引: {}",
        text
    );
    assert!(text.contains("IF (t1.1 <= 99)"));
    assert!(text.contains("INSERT (t0.0, t1.1) INTO @new_path IF NOT IN path"));
    assert!(text.contains("SWAP (@delta_path, @new_path)"));

    // 再次运行没有改变
    assert!(!pipeline.run(&mut program).expect("流水线失败"));
}

#[test]
fn test_optimized_program_json_round_trip() {
    let analysis = StaticIndexAnalysis::new().with_index("edge", vec![0]);
    let mut pipeline = TransformPipeline::with_index_passes(&analysis, OptimizerConfig::default());
    let mut program = transitive_closure();
    pipeline.run(&mut program).expect("流水线失败");

    let text = program.to_json().expect("序列化失败");
    let restored = Program::from_json(&text).expect("反序列化失败");
    assert_eq!(restored, program);
    assert!(ProgramValidator::validate_program(&restored).is_ok());
}

#[test]
fn test_disabled_removal_leaves_empty_index() {
    let analysis = FixedIndexAnalysis::new().discharging("R", &[0]);
    let config = OptimizerConfig::default().disable(RemoveEmptyIndexTransformer::NAME);
    let mut pipeline = TransformPipeline::with_index_passes(&analysis, config);

    let mut program = program_with(
        IndexScan::new(rel("R", 2), 0, pattern(&[Some(1), None], &[Some(1), None]), insert_s(0), "")
            .into(),
    );
    assert!(pipeline.run(&mut program).expect("流水线失败"));
    assert_eq!(ProgramValidator::find_empty_index_operations(&program).len(), 1);
    assert!(ProgramValidator::check_no_empty_index(&program).is_err());
}

#[test]
fn test_composite_transformer_in_pipeline() {
    let analysis = FixedIndexAnalysis::new().discharging("R", &[1]);
    let mut pipeline = TransformPipeline::new(OptimizerConfig::default());
    pipeline.add(IndexedInequalityTransformer::new(&analysis));
    assert_eq!(pipeline.transformer_names(), vec!["IndexedInequalityTransformer"]);

    let mut program = program_with(
        IndexScan::new(rel("R", 2), 0, pattern(&[None, Some(2)], &[None, None]), insert_s(0), "")
            .into(),
    );
    assert!(pipeline.run(&mut program).expect("流水线失败"));
    assert_eq!(
        operation_names(program.queries()[0].operation()),
        vec!["Scan", "Filter", "Project"]
    );
}

#[test]
fn test_pipeline_rejects_arity_mismatch() {
    let analysis = FixedIndexAnalysis::new();
    let mut pipeline = TransformPipeline::with_index_passes(&analysis, OptimizerConfig::default());

    let mut program = program_with(
        IndexScan::new(
            RelationReference::new("R", 3),
            0,
            RangePattern::unbounded(3),
            insert_s(0),
            "",
        )
        .into(),
    );
    assert_err_with(pipeline.run(&mut program), "元数");
}

#[test]
fn test_existence_check_arity_is_validated() {
    let mut program = program_with(
        Scan::new(
            rel("R", 2),
            0,
            ramlog::ram::operation::Filter::new(
                Condition::negation(Condition::ExistenceCheck {
                    relation: rel("S", 1),
                    values: vec![Expression::tuple_element(0, 0), Expression::Undefined],
                }),
                insert_s(0),
            )
            .into(),
            "",
        )
        .into(),
    );
    assert_err_with(ProgramValidator::validate_program(&program), "存在性检查");

    // 修正后通过
    program = program_with(
        Scan::new(
            rel("R", 2),
            0,
            ramlog::ram::operation::Filter::new(
                Condition::constraint(
                    BinaryConstraintOp::Lt,
                    Expression::tuple_element(0, 0),
                    Expression::tuple_element(0, 1),
                ),
                insert_s(0),
            )
            .into(),
            "",
        )
        .into(),
    );
    assert!(ProgramValidator::validate_program(&program).is_ok());
}

#[test]
fn test_mismatched_pattern_bounds_are_rejected() {
    let analysis = FixedIndexAnalysis::new().discharging("R", &[1]);
    let malformed = || -> Program {
        program_with(
            IndexScan::new(
                rel("R", 2),
                0,
                RangePattern::new(
                    vec![Expression::signed(1), Expression::Undefined],
                    vec![Expression::signed(1)],
                ),
                insert_s(0),
                "",
            )
            .into(),
        )
    };

    // 加载路径：JSON 中上界比下界短
    let mut value: serde_json::Value = serde_json::from_str(
        &program_with(
            IndexScan::new(rel("R", 2), 0, pattern(&[Some(1), None], &[Some(1), None]), insert_s(0), "")
                .into(),
        )
        .to_json()
        .expect("序列化失败"),
    )
    .expect("解析失败");
    value["statements"][0]["Query"]["operation"]["IndexScan"]["pattern"]["upper"]
        .as_array_mut()
        .expect("upper 应为数组")
        .pop();
    assert_err_with(Program::from_json(&value.to_string()), "不一致");

    // 构造路径：流水线在转换前报告校验错误
    let mut program = malformed();
    let mut pipeline = TransformPipeline::with_index_passes(&analysis, OptimizerConfig::default());
    assert_err_with(pipeline.run(&mut program), "上下界长度不一致");
    assert_eq!(analysis.calls(), 0);

    // 关闭校验时由转换本身报告错误
    let mut program = malformed();
    let mut lenient = TransformPipeline::with_index_passes(
        &analysis,
        OptimizerConfig {
            validate: false,
            ..OptimizerConfig::default()
        },
    );
    assert_err_with(lenient.run(&mut program), "上下界长度不一致");
    assert_eq!(program, malformed());
}
