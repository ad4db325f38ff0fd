use fraud_infer::fraud::{FraudNetwork, FraudParameters};
use fraud_infer::query::{parse_evidence, scenarios, EngineKind, Query, QueryRunner, Scenario};
use fraud_infer::{
    Assignment, ConditionalInferenceEngine, DeclarationOrder, EliminationOrdering, EnumerationEngine, Factor,
    InferError, Initialization, MaxCardinality, MinFill, NetworkBuilder, Variable, VariableEliminationEngine,
};

const TOL: f64 = 1e-9;

/// P(target = +) for scenarios 1 to 5, from exhaustive enumeration of the joint
const TEXTBOOK: [(&str, f64); 5] = [
    ("+fraud", 0.012),
    ("+ip", 0.7740649258997883),
    ("+fraud", 0.05263157894736843),
    ("+fraud", 0.059931506849315065),
    ("+fraud", 0.2671181584345391),
];

const REALISTIC: [(&str, f64); 5] = [
    ("+fraud", 0.0065),
    ("+ip", 0.02426198023494313),
    ("+fraud", 0.0909090909090909),
    ("+fraud", 0.11831119544592032),
    ("+fraud", 0.11308804314000284),
];

fn check_scenarios(params: &FraudParameters, expected: &[(&str, f64); 5]) {
    let fraud = FraudNetwork::build(params).unwrap();
    let ve = QueryRunner::new(&fraud.network);
    let oracle = QueryRunner::with_engine(&fraud.network, EngineKind::Enumeration, Box::new(DeclarationOrder));

    for (scenario, &(label, p)) in scenarios().iter().zip(expected.iter()) {
        let dist = ve.run(&scenario.query).unwrap();
        let reference = oracle.run(&scenario.query).unwrap();

        assert!((dist.total() - 1.0).abs() < TOL, "scenario {} does not sum to 1", scenario.id);
        assert!(
            (dist.probability(label).unwrap() - p).abs() < TOL,
            "scenario {}: {} != {}",
            scenario.id,
            dist.probability(label).unwrap(),
            p
        );

        for ((l1, p1), (l2, p2)) in dist.entries.iter().zip(reference.entries.iter()) {
            assert_eq!(l1, l2);
            assert!((p1 - p2).abs() < TOL, "scenario {} disagrees with enumeration", scenario.id);
        }
    }
}

#[test]
fn textbook_scenarios() {
    check_scenarios(&FraudParameters::TEXTBOOK, &TEXTBOOK);
}

#[test]
fn realistic_scenarios() {
    check_scenarios(&FraudParameters::REALISTIC, &REALISTIC);
}

#[test]
fn orderings_agree() {
    let fraud = FraudNetwork::build(&FraudParameters::TEXTBOOK).unwrap();
    let evidence: Assignment = vec![(fraud.fp, 0), (fraud.ip, 1), (fraud.crp, 0)].into_iter().collect();

    let strategies: Vec<Box<dyn EliminationOrdering>> = vec![
        Box::new(DeclarationOrder),
        Box::new(MinFill),
        Box::new(MaxCardinality),
    ];

    let reference = EnumerationEngine::new(&fraud.network).infer(fraud.fraud, &evidence).unwrap();
    for ordering in strategies {
        let engine = VariableEliminationEngine::with_ordering(&fraud.network, ordering);
        let f = engine.infer(fraud.fraud, &evidence).unwrap();
        assert!(f.approx_eq(&reference, TOL));
    }
}

#[test]
fn marginal_of_every_variable() {
    let fraud = FraudNetwork::build(&FraudParameters::REALISTIC).unwrap();
    let ve = VariableEliminationEngine::new(&fraud.network);
    let oracle = EnumerationEngine::new(&fraud.network);

    for v in fraud.network.variables() {
        let f = ve.infer(v, &Assignment::new()).unwrap();
        assert!(f.approx_eq(&oracle.infer(v, &Assignment::new()).unwrap(), TOL));
    }

    // the root variables' marginals are their CPTs
    let f = ve.infer(fraud.trav, &Assignment::new()).unwrap();
    assert!(f.approx_eq(fraud.network.cpt(&fraud.trav).unwrap(), TOL));
}

#[test]
fn zero_probability_evidence() {
    let fraud = Variable::binary();
    let alarm = Variable::binary();
    let call = Variable::binary();

    // the alarm only sounds on fraud, and fraud never happens
    let model = NetworkBuilder::new()
        .with_named_variable(&fraud, "Fraud", &[], Initialization::Binomial(0.0))
        .with_named_variable(&alarm, "Alarm", &[fraud], Initialization::Values(vec![1.0, 0.0, 0.0, 1.0]))
        .with_named_variable(&call, "Call", &[alarm], Initialization::Values(vec![0.9, 0.1, 0.05, 0.95]))
        .build()
        .unwrap();

    let evidence: Assignment = vec![(alarm, 0)].into_iter().collect();
    let engines: Vec<Box<dyn ConditionalInferenceEngine + '_>> = vec![
        Box::new(VariableEliminationEngine::new(&model)),
        Box::new(EnumerationEngine::new(&model)),
    ];

    for engine in engines.iter() {
        assert_eq!(Err(InferError::DegenerateDistribution), engine.infer(call, &evidence));
        assert_eq!(Err(InferError::DegenerateDistribution), engine.infer(fraud, &evidence));
    }

    // the same network answers consistent evidence
    let evidence: Assignment = vec![(alarm, 1)].into_iter().collect();
    let f = VariableEliminationEngine::new(&model).infer(fraud, &evidence).unwrap();
    let assn: Assignment = vec![(fraud, 1)].into_iter().collect();
    assert!((f.value(&assn).unwrap() - 1.0).abs() < TOL);
}

#[test]
fn invalid_evidence_leaves_network_untouched() {
    let fraud = FraudNetwork::build(&FraudParameters::TEXTBOOK).unwrap();
    let before: Vec<Factor> = fraud.network.cpts().cloned().collect();
    let engine = VariableEliminationEngine::new(&fraud.network);

    let evidence: Assignment = vec![(fraud.fp, 0), (fraud.trav, 2)].into_iter().collect();
    match engine.infer(fraud.fraud, &evidence) {
        Err(InferError::InvalidQuery(_)) => (),
        other => panic!("wrong result {:?}", other)
    };

    let runner = QueryRunner::new(&fraud.network);
    let query = Query::new("Fraud", vec![(String::from("FP"), String::from("maybe"))]);
    match runner.run(&query) {
        Err(InferError::InvalidQuery(_)) => (),
        other => panic!("wrong result {:?}", other)
    };

    let after: Vec<Factor> = fraud.network.cpts().cloned().collect();
    assert_eq!(before, after);

    // and the engine still answers valid queries afterwards
    let evidence: Assignment = vec![(fraud.fp, 0), (fraud.trav, 0)].into_iter().collect();
    let f = engine.infer(fraud.fraud, &evidence).unwrap();
    let assn: Assignment = vec![(fraud.fraud, 0)].into_iter().collect();
    assert!((f.value(&assn).unwrap() - 0.05263157894736843).abs() < TOL);
}

#[test]
fn repeated_queries_are_identical() {
    let fraud = FraudNetwork::build(&FraudParameters::TEXTBOOK).unwrap();
    let runner = QueryRunner::new(&fraud.network);
    let scenario = Scenario::find("5").unwrap();

    let first = runner.run(&scenario.query).unwrap();
    for _ in 0..10 {
        assert_eq!(first, runner.run(&scenario.query).unwrap());
    }
}

#[test]
fn concurrent_queries() {
    let fraud = FraudNetwork::build(&FraudParameters::REALISTIC).unwrap();
    let runner = QueryRunner::new(&fraud.network);

    let sequential: Vec<_> = scenarios().iter().map(|s| runner.run(&s.query).unwrap()).collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| scenarios().iter().map(|s| runner.run(&s.query).unwrap()).collect::<Vec<_>>()))
            .collect();

        for handle in handles {
            assert_eq!(sequential, handle.join().unwrap());
        }
    });
}

#[test]
fn json_output() {
    let fraud = FraudNetwork::build(&FraudParameters::TEXTBOOK).unwrap();
    let runner = QueryRunner::new(&fraud.network);
    let dist = runner.run(&Scenario::find("fraud-prior").unwrap().query).unwrap();

    let json: serde_json::Value = serde_json::to_value(&dist).unwrap();
    assert_eq!("Fraud", json["variable"]);
    assert_eq!("+fraud", json["entries"][0][0]);
    assert!((json["entries"][0][1].as_f64().unwrap() - 0.012).abs() < TOL);
    assert!(json["evidence"].as_array().unwrap().is_empty());
}

#[test]
fn ad_hoc_query_from_command_line_text() {
    let fraud = FraudNetwork::build(&FraudParameters::TEXTBOOK).unwrap();
    let runner = QueryRunner::new(&fraud.network);

    // `--query Fraud --evidence "FP=+, IP=false, CRP=+crp"` is scenario 5 spelled differently
    let query = Query::new("Fraud", parse_evidence("FP=+, IP=false, CRP=+crp").unwrap());
    let dist = runner.run(&query).unwrap();
    let named = runner.run(&Scenario::find("5").unwrap().query).unwrap();

    assert_eq!(named.evidence, dist.evidence);
    assert_eq!(named.entries, dist.entries);
    assert_eq!(vec!["+fp", "-ip", "+crp"], dist.evidence);

    let summary = dist.to_string();
    assert!(summary.starts_with("P(Fraud | +fp, -ip, +crp)\n"));
    assert!(summary.contains("+fraud  0.26712"));
}
