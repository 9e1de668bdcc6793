//! Unit tests for fr-planner.
//!
//! Fixtures place sensors on a meridian or on the equator so that edge
//! lengths are exact kilometre multiples.

#[cfg(test)]
mod helpers {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use fr_core::{EARTH_RADIUS_KM, SensorId, TimePoint};
    use fr_flow::{FlowOracle, FlowResult};
    use fr_network::{EdgeRecord, NodeRecord};

    /// Degrees of arc spanning `km` on a great circle.
    pub fn deg(km: f64) -> f64 {
        km / (EARTH_RADIUS_KM * std::f64::consts::PI / 180.0)
    }

    pub fn s(id: u32) -> SensorId {
        SensorId(id)
    }

    /// Sensors 1 and 2 joined by one 3 km edge.
    pub fn single_edge() -> (Vec<NodeRecord>, Vec<EdgeRecord>) {
        let nodes = vec![NodeRecord::new(1, 40.0, 116.0), NodeRecord::new(2, 40.0 + deg(3.0), 116.0)];
        (nodes, vec![EdgeRecord::new(1, 2)])
    }

    /// Two routes from 1 to 4 of exactly equal length.
    ///
    /// ```text
    ///        2
    ///      /   \
    ///    1       4
    ///      \   /
    ///        3
    /// ```
    ///
    /// Edges are listed so that the route through 3 is discovered first.
    pub fn diamond() -> (Vec<NodeRecord>, Vec<EdgeRecord>) {
        let d = deg(1.0);
        let nodes = vec![
            NodeRecord::new(1, 0.0, 0.0),
            NodeRecord::new(2, d, d),
            NodeRecord::new(3, -d, d),
            NodeRecord::new(4, 0.0, 2.0 * d),
        ];
        let edges = vec![
            EdgeRecord::new(1, 3),
            EdgeRecord::new(3, 4),
            EdgeRecord::new(1, 2),
            EdgeRecord::new(2, 4),
        ];
        (nodes, edges)
    }

    /// A straight 2 km route 1–2–4 and a ~2.83 km detour 1–3–4.
    ///
    /// ```text
    ///          3
    ///        /   \
    ///    1 ── 2 ── 4
    /// ```
    pub fn bypass() -> (Vec<NodeRecord>, Vec<EdgeRecord>) {
        let d = deg(1.0);
        let nodes = vec![
            NodeRecord::new(1, 0.0, 0.0),
            NodeRecord::new(2, 0.0, d),
            NodeRecord::new(3, d, d),
            NodeRecord::new(4, 0.0, 2.0 * d),
        ];
        let edges = vec![
            EdgeRecord::new(1, 2),
            EdgeRecord::new(2, 4),
            EdgeRecord::new(1, 3),
            EdgeRecord::new(3, 4),
        ];
        (nodes, edges)
    }

    /// Flow 100 at sensor 2, zero elsewhere.
    pub fn jam_at_2() -> Arc<dyn FlowOracle> {
        Arc::new(|s: SensorId, _t: TimePoint| -> FlowResult<f64> { Ok(if s.0 == 2 { 100.0 } else { 0.0 }) })
    }

    /// Constant flow 10 that counts its calls.
    pub fn counting() -> (Arc<dyn FlowOracle>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let oracle = move |_s: SensorId, _t: TimePoint| -> FlowResult<f64> {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(10.0)
        };
        (Arc::new(oracle), calls)
    }
}

// ── Scoring ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scoring {
    use std::sync::Arc;

    use fr_core::{SensorId, TimePoint};
    use fr_flow::{ConstantOracle, FlowAdapter, TableOracle};
    use fr_network::SensorGraph;
    use proptest::prelude::*;

    use super::helpers::{bypass, single_edge};
    use crate::{congestion_weight, score_edges};

    #[test]
    fn formula() {
        assert_eq!(congestion_weight(3.0, 10.0, 10.0, 0.05), 4.5);
        assert_eq!(congestion_weight(3.0, 0.0, 20.0, 0.05), 4.5);
        assert_eq!(congestion_weight(3.0, 50.0, 50.0, 0.0), 3.0);
        assert_eq!(congestion_weight(0.0, 80.0, 80.0, 0.05), 0.0);
    }

    #[test]
    fn three_km_at_flow_ten() {
        let (nodes, edges) = single_edge();
        let graph = SensorGraph::from_records(&nodes, &edges).unwrap();
        let flows = FlowAdapter::new(Arc::new(ConstantOracle(10.0)));
        let w = score_edges(&graph, &flows, TimePoint(0), 0.05).unwrap();
        assert_eq!(w.len(), 1);
        assert!((w[0] - 4.5).abs() < 1e-6, "got {}", w[0]);
    }

    #[test]
    fn zero_flow_gives_distance() {
        let (nodes, edges) = bypass();
        let graph = SensorGraph::from_records(&nodes, &edges).unwrap();
        let flows = FlowAdapter::new(Arc::new(ConstantOracle(0.0)));
        let w = score_edges(&graph, &flows, TimePoint(0), 0.05).unwrap();
        assert_eq!(w, graph.edge_distance_km);
    }

    #[test]
    fn scoring_failure_returns_no_weights() {
        let (nodes, edges) = bypass();
        let graph = SensorGraph::from_records(&nodes, &edges).unwrap();
        let mut table = TableOracle::new();
        table.insert(SensorId(1), TimePoint(0), 5.0);
        let flows = FlowAdapter::new(Arc::new(table));
        assert!(score_edges(&graph, &flows, TimePoint(0), 0.05).is_err());
    }

    proptest! {
        #[test]
        fn weight_never_below_distance(
            d     in 0.0f64..1_000.0,
            fu    in 0.0f64..10_000.0,
            fv    in 0.0f64..10_000.0,
            alpha in 0.0f64..1.0,
        ) {
            prop_assert!(congestion_weight(d, fu, fv, alpha) >= d);
        }

        #[test]
        fn doubling_flow_raises_weight(
            d     in 0.01f64..1_000.0,
            fu    in 0.1f64..10_000.0,
            fv    in 0.1f64..10_000.0,
            alpha in 0.01f64..1.0,
        ) {
            prop_assert!(congestion_weight(d, 2.0 * fu, 2.0 * fv, alpha) > congestion_weight(d, fu, fv, alpha));
        }

        #[test]
        fn scored_graph_weights_cover_distances(
            flows in proptest::collection::vec(0.0f64..500.0, 4),
            alpha in 0.0f64..2.0,
        ) {
            let (nodes, edges) = bypass();
            let graph = SensorGraph::from_records(&nodes, &edges).unwrap();
            let mut table = TableOracle::new();
            for (i, &f) in flows.iter().enumerate() {
                table.insert(SensorId(i as u32 + 1), TimePoint(7), f);
            }
            let adapter = FlowAdapter::new(Arc::new(table));
            let w = score_edges(&graph, &adapter, TimePoint(7), alpha).unwrap();
            for (weight, dist) in w.iter().zip(&graph.edge_distance_km) {
                prop_assert!(weight >= dist);
            }
        }
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use std::time::Duration;

    use fr_core::TimePoint;

    use crate::{InputError, PlanError, PlannerConfig};

    #[test]
    fn defaults() {
        let c = PlannerConfig::default();
        assert_eq!(c.alpha, 0.05);
        assert_eq!(c.reference_time, TimePoint(0));
        assert_eq!(c.oracle_timeout(), None);
        assert_eq!(c.batch_size, 256);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_json_is_default() {
        let c: PlannerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(c, PlannerConfig::default());
    }

    #[test]
    fn partial_json() {
        let c: PlannerConfig =
            serde_json::from_str(r#"{"alpha": 0.1, "reference_time": 100, "oracle_timeout_ms": 500}"#).unwrap();
        assert_eq!(c.alpha, 0.1);
        assert_eq!(c.reference_time, TimePoint(100));
        assert_eq!(c.oracle_timeout(), Some(Duration::from_millis(500)));
        assert_eq!(c.batch_size, 256);
    }

    #[test]
    fn rejects_bad_values() {
        for alpha in [-0.01, f64::NAN, f64::INFINITY] {
            let c = PlannerConfig { alpha, ..PlannerConfig::default() };
            assert!(matches!(c.validate(), Err(PlanError::InvalidInput(InputError::Config(_)))));
        }
        let c = PlannerConfig { batch_size: 0, ..PlannerConfig::default() };
        assert!(matches!(c.validate(), Err(PlanError::InvalidInput(InputError::Config(_)))));
    }
}

// ── Planning ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod planning {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use fr_core::TimePoint;
    use fr_flow::{ConstantOracle, TableOracle};
    use fr_network::{DijkstraRouter, EdgeRecord, NodeRecord, Router, SensorGraph, WeightedGraph};

    use super::helpers::{bypass, counting, diamond, jam_at_2, s, single_edge};
    use crate::{PlanOutcome, Planner, PlannerConfig, plan_route};

    fn planner(oracle: Arc<dyn fr_flow::FlowOracle>) -> Planner {
        Planner::new(PlannerConfig::default(), oracle)
    }

    #[test]
    fn single_edge_costs_four_and_a_half() {
        let (nodes, edges) = single_edge();
        let out = plan_route(Arc::new(ConstantOracle(10.0)), &nodes, &edges, s(1), s(2), TimePoint(0), 0.05).unwrap();
        let path = out.path().expect("route exists");
        assert_eq!(path.path, vec![s(1), s(2)]);
        assert!((path.total_cost - 4.5).abs() < 1e-6, "got {}", path.total_cost);
    }

    #[test]
    fn alpha_zero_is_pure_distance() {
        let (nodes, edges) = bypass();
        let out = planner(jam_at_2()).plan_route(&nodes, &edges, s(1), s(4), TimePoint(0), Some(0.0)).unwrap();

        let graph = SensorGraph::from_records(&nodes, &edges).unwrap();
        let by_distance = DijkstraRouter
            .shortest_path(&WeightedGraph::by_distance(&graph), s(1), s(4))
            .unwrap()
            .unwrap();

        assert_eq!(out, PlanOutcome::Found(by_distance));
        assert_eq!(out.path().unwrap().path, vec![s(1), s(2), s(4)]);
    }

    #[test]
    fn congestion_diverts_route() {
        let (nodes, edges) = bypass();
        let out = planner(jam_at_2()).plan_route(&nodes, &edges, s(1), s(4), TimePoint(0), None).unwrap();
        let path = out.into_path().unwrap();
        assert_eq!(path.path, vec![s(1), s(3), s(4)]);
        assert!((path.total_cost - 2.0 * std::f64::consts::SQRT_2).abs() < 1e-3);
    }

    #[test]
    fn disconnected_is_no_path() {
        let nodes = vec![
            NodeRecord::new(1, 10.0, 10.0),
            NodeRecord::new(2, 10.01, 10.0),
            NodeRecord::new(3, 20.0, 20.0),
        ];
        let edges = vec![EdgeRecord::new(1, 2)];
        let out = planner(Arc::new(ConstantOracle(5.0)))
            .plan_route(&nodes, &edges, s(1), s(3), TimePoint(0), None)
            .unwrap();
        assert_eq!(out, PlanOutcome::NoPath { source: s(1), target: s(3) });
        assert!(!out.is_found());
    }

    #[test]
    fn source_equals_target() {
        let (nodes, edges) = single_edge();
        let out = planner(Arc::new(ConstantOracle(10.0)))
            .plan_route(&nodes, &edges, s(2), s(2), TimePoint(0), None)
            .unwrap();
        let path = out.into_path().unwrap();
        assert_eq!(path.path, vec![s(2)]);
        assert_eq!(path.total_cost, 0.0);
    }

    #[test]
    fn idempotent() {
        let (nodes, edges) = bypass();
        let mut table = TableOracle::new();
        for (id, flow) in [(1, 12.0), (2, 40.0), (3, 7.5), (4, 3.0)] {
            table.insert(s(id), TimePoint(100), flow);
        }
        let p = planner(Arc::new(table));
        let a = p.plan_route(&nodes, &edges, s(1), s(4), TimePoint(100), None).unwrap();
        let b = p.plan_route(&nodes, &edges, s(1), s(4), TimePoint(100), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn equal_cost_tie_is_stable() {
        let (nodes, edges) = diamond();
        let p = planner(Arc::new(ConstantOracle(20.0)));
        for _ in 0..10 {
            let out = p.plan_route(&nodes, &edges, s(1), s(4), TimePoint(0), None).unwrap();
            assert_eq!(out.path().unwrap().path, vec![s(1), s(2), s(4)]);
        }
    }

    #[test]
    fn each_sensor_queried_once_per_call() {
        let (nodes, edges) = diamond();
        let (oracle, calls) = counting();
        let p = planner(oracle);
        p.plan_route(&nodes, &edges, s(1), s(4), TimePoint(0), None).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        // Nothing is carried over to the next call.
        p.plan_route(&nodes, &edges, s(1), s(4), TimePoint(0), None).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn prebuilt_graph() {
        let (nodes, edges) = bypass();
        let graph = SensorGraph::from_records(&nodes, &edges).unwrap();
        let p = planner(jam_at_2());
        let jammed = p.plan_on_graph(&graph, s(1), s(4), TimePoint(0), None).unwrap();
        let free = p.plan_on_graph(&graph, s(1), s(4), TimePoint(0), Some(0.0)).unwrap();
        assert_eq!(jammed.path().unwrap().path, vec![s(1), s(3), s(4)]);
        assert_eq!(free.path().unwrap().path, vec![s(1), s(2), s(4)]);
    }

    #[test]
    fn explicit_time_overrides_reference_time() {
        let (nodes, edges) = single_edge();
        let mut table = TableOracle::new();
        table.insert(s(1), TimePoint(100), 10.0);
        table.insert(s(2), TimePoint(100), 10.0);
        // The table has nothing at t5, so reading the config time would fail.
        let config = PlannerConfig { reference_time: TimePoint(5), ..PlannerConfig::default() };
        let out = Planner::new(config, Arc::new(table))
            .plan_route(&nodes, &edges, s(1), s(2), TimePoint(100), None)
            .unwrap();
        assert!((out.path().unwrap().total_cost - 4.5).abs() < 1e-6);
    }

    /// Delegates to Dijkstra and counts its calls.
    struct CountingRouter(std::sync::atomic::AtomicUsize);

    impl Router for CountingRouter {
        fn shortest_path(
            &self,
            graph: &WeightedGraph<'_>,
            from:  fr_core::SensorId,
            to:    fr_core::SensorId,
        ) -> fr_network::NetworkResult<Option<fr_network::PathResult>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            DijkstraRouter.shortest_path(graph, from, to)
        }
    }

    /// Never finds anything.
    struct NoRoute;

    impl Router for NoRoute {
        fn shortest_path(
            &self,
            _graph: &WeightedGraph<'_>,
            _from:  fr_core::SensorId,
            _to:    fr_core::SensorId,
        ) -> fr_network::NetworkResult<Option<fr_network::PathResult>> {
            Ok(None)
        }
    }

    #[test]
    fn custom_router_runs_on_scored_graph() {
        let (nodes, edges) = bypass();
        let p = planner(jam_at_2()).with_router(CountingRouter(Default::default()));
        let out = p.plan_route(&nodes, &edges, s(1), s(4), TimePoint(0), None).unwrap();
        assert_eq!(out.path().unwrap().path, vec![s(1), s(3), s(4)]);
        assert_eq!(p.config().alpha, PlannerConfig::default().alpha);
        p.plan_route(&nodes, &edges, s(1), s(4), TimePoint(0), None).unwrap();
        assert_eq!(p.router().0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn custom_router_none_is_no_path() {
        let (nodes, edges) = single_edge();
        let out = planner(Arc::new(ConstantOracle(1.0)))
            .with_router(NoRoute)
            .plan_route(&nodes, &edges, s(1), s(2), TimePoint(0), None)
            .unwrap();
        assert_eq!(out, PlanOutcome::NoPath { source: s(1), target: s(2) });
    }

    #[test]
    fn serializes_like_a_path_result() {
        let (nodes, edges) = single_edge();
        let out = planner(Arc::new(ConstantOracle(0.0)))
            .plan_route(&nodes, &edges, s(1), s(2), TimePoint(0), None)
            .unwrap();
        let v = serde_json::to_value(out.path().unwrap()).unwrap();
        assert_eq!(v["path"], serde_json::json!([1, 2]));
        assert!((v["totalCost"].as_f64().unwrap() - 3.0).abs() < 1e-6);
    }
}

// ── Failures ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod failures {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use fr_core::{SensorId, TimePoint};
    use fr_flow::{ConstantOracle, FlowError, FlowResult};
    use fr_network::{EdgeRecord, NetworkError, NodeRecord};

    use super::helpers::{counting, diamond, s, single_edge};
    use crate::{InputError, PlanError, Planner, PlannerConfig};

    #[test]
    fn duplicate_edge_is_invalid_input() {
        let (nodes, mut edges) = single_edge();
        edges.push(EdgeRecord::new(2, 1));
        let r = Planner::new(PlannerConfig::default(), Arc::new(ConstantOracle(1.0)))
            .plan_route(&nodes, &edges, s(1), s(2), TimePoint(0), None);
        assert!(matches!(
            r,
            Err(PlanError::InvalidInput(InputError::Network(NetworkError::DuplicateEdge { .. })))
        ));
    }

    #[test]
    fn missing_endpoint_is_invalid_input() {
        let (nodes, mut edges) = single_edge();
        edges.push(EdgeRecord::new(2, 9));
        let r = Planner::new(PlannerConfig::default(), Arc::new(ConstantOracle(1.0)))
            .plan_route(&nodes, &edges, s(1), s(2), TimePoint(0), None);
        assert!(matches!(
            r,
            Err(PlanError::InvalidInput(InputError::Network(NetworkError::UnknownEndpoint { .. })))
        ));
    }

    #[test]
    fn bad_coordinate_is_invalid_input() {
        let nodes = vec![NodeRecord::new(1, 91.0, 0.0), NodeRecord::new(2, 0.0, 0.0)];
        let r = Planner::new(PlannerConfig::default(), Arc::new(ConstantOracle(1.0)))
            .plan_route(&nodes, &[EdgeRecord::new(1, 2)], s(1), s(2), TimePoint(0), None);
        assert!(matches!(r, Err(PlanError::InvalidInput(_))));
    }

    #[test]
    fn unknown_source_fails_before_oracle() {
        let (nodes, edges) = diamond();
        let (oracle, calls) = counting();
        let p = Planner::new(PlannerConfig::default(), oracle);

        let r = p.plan_route(&nodes, &edges, s(99), s(4), TimePoint(0), None);
        assert!(matches!(
            r,
            Err(PlanError::InvalidInput(InputError::Network(NetworkError::UnknownSensor(SensorId(99)))))
        ));
        let r = p.plan_route(&nodes, &edges, s(1), s(98), TimePoint(0), None);
        assert!(matches!(r, Err(PlanError::InvalidInput(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn bad_alpha_fails_before_oracle() {
        let (nodes, edges) = diamond();
        let (oracle, calls) = counting();
        let p = Planner::new(PlannerConfig::default(), oracle);
        let r = p.plan_route(&nodes, &edges, s(1), s(4), TimePoint(0), Some(-0.5));
        assert!(matches!(r, Err(PlanError::InvalidInput(InputError::Config(_)))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn negative_flow_is_oracle_unavailable() {
        let (nodes, edges) = diamond();
        let oracle = |sensor: SensorId, _t: TimePoint| -> FlowResult<f64> {
            Ok(if sensor.0 == 3 { -1.0 } else { 4.0 })
        };
        let r = Planner::new(PlannerConfig::default(), Arc::new(oracle))
            .plan_route(&nodes, &edges, s(1), s(4), TimePoint(0), None);
        assert!(matches!(
            r,
            Err(PlanError::OracleUnavailable(FlowError::InvalidFlow { sensor: SensorId(3), .. }))
        ));
    }

    #[test]
    fn oracle_error_is_oracle_unavailable() {
        let (nodes, edges) = diamond();
        let oracle = |sensor: SensorId, _t: TimePoint| -> FlowResult<f64> {
            if sensor.0 == 2 { Err(FlowError::UnknownSensor(sensor)) } else { Ok(1.0) }
        };
        let r = Planner::new(PlannerConfig::default(), Arc::new(oracle))
            .plan_route(&nodes, &edges, s(1), s(4), TimePoint(0), None);
        assert!(matches!(r, Err(PlanError::OracleUnavailable(FlowError::UnknownSensor(_)))));
    }

    #[test]
    fn slow_oracle_times_out() {
        let (nodes, edges) = diamond();
        let oracle = |_s: SensorId, _t: TimePoint| -> FlowResult<f64> {
            std::thread::sleep(Duration::from_millis(300));
            Ok(1.0)
        };
        let config = PlannerConfig { oracle_timeout_ms: Some(20), ..PlannerConfig::default() };
        let r = Planner::new(config, Arc::new(oracle)).plan_route(&nodes, &edges, s(1), s(4), TimePoint(0), None);
        assert!(matches!(r, Err(PlanError::OracleUnavailable(FlowError::Timeout { .. }))));
    }

    #[test]
    fn huge_finite_flows_still_score() {
        // (1e308 + 1e308) overflows, the halved sum does not.
        let (nodes, edges) = single_edge();
        let out = Planner::new(PlannerConfig::default(), Arc::new(ConstantOracle(1e308)))
            .plan_route(&nodes, &edges, s(1), s(2), TimePoint(0), None)
            .unwrap();
        let cost = out.path().expect("route exists").total_cost;
        assert!(cost.is_finite() && cost > 1e307, "got {cost}");
    }

    #[test]
    fn infinite_weight_is_oracle_unavailable() {
        let (nodes, edges) = single_edge();
        let r = Planner::new(PlannerConfig::default(), Arc::new(ConstantOracle(f64::MAX)))
            .plan_route(&nodes, &edges, s(1), s(2), TimePoint(3), Some(1.0));
        match r {
            Err(PlanError::OracleUnavailable(FlowError::WeightOverflow { from, to, time, .. })) => {
                assert_eq!((from, to), (s(1), s(2)));
                assert_eq!(time, TimePoint(3));
            }
            other => panic!("expected a weight overflow, got {other:?}"),
        }
    }

    #[test]
    fn zero_batch_size_is_invalid_input() {
        let (nodes, edges) = single_edge();
        let config = PlannerConfig { batch_size: 0, ..PlannerConfig::default() };
        let r = Planner::new(config, Arc::new(ConstantOracle(1.0)))
            .plan_route(&nodes, &edges, s(1), s(2), TimePoint(0), None);
        assert!(matches!(r, Err(PlanError::InvalidInput(InputError::Config(_)))));
    }

    #[test]
    fn error_messages() {
        let e = PlanError::from(NetworkError::SelfLoop(SensorId(5)));
        assert!(e.to_string().starts_with("invalid input:"));
        let e = PlanError::from(FlowError::UnknownSensor(SensorId(5)));
        assert!(e.to_string().starts_with("flow oracle unavailable:"));
    }
}

// ── Reports ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod reports {
    use std::sync::Arc;

    use fr_core::TimePoint;
    use fr_flow::ConstantOracle;
    use fr_network::{EdgeRecord, NodeRecord};

    use super::helpers::{bypass, jam_at_2, s, single_edge};
    use crate::{CongestionLevel, PlanOutcome, Planner, PlannerConfig};

    #[test]
    fn congestion_buckets() {
        assert_eq!(CongestionLevel::from_flow(0.0), CongestionLevel::Free);
        assert_eq!(CongestionLevel::from_flow(10.0), CongestionLevel::Free);
        assert_eq!(CongestionLevel::from_flow(10.5), CongestionLevel::Light);
        assert_eq!(CongestionLevel::from_flow(30.0), CongestionLevel::Light);
        assert_eq!(CongestionLevel::from_flow(60.0), CongestionLevel::Moderate);
        assert_eq!(CongestionLevel::from_flow(100.0), CongestionLevel::Heavy);
        assert_eq!(CongestionLevel::from_flow(100.1), CongestionLevel::Severe);
        assert_eq!(CongestionLevel::Heavy.to_string(), "heavy");
    }

    #[test]
    fn single_leg_report() {
        let (nodes, edges) = single_edge();
        let p = Planner::new(PlannerConfig::default(), Arc::new(ConstantOracle(10.0)));
        let (out, report) = p.plan_route_with_report(&nodes, &edges, s(1), s(2), TimePoint(5), None).unwrap();
        assert!(out.is_found());
        let report = report.expect("report for a found route");

        assert_eq!(report.legs.len(), 1);
        let leg = &report.legs[0];
        assert_eq!((leg.from, leg.to), (s(1), s(2)));
        assert!((leg.distance_km - 3.0).abs() < 1e-6);
        assert!((leg.weight - 4.5).abs() < 1e-6);
        assert_eq!(leg.avg_flow, 10.0);
        assert_eq!(leg.level, CongestionLevel::Free);
        assert!((report.total_distance_km - 3.0).abs() < 1e-6);
        assert!((report.total_cost - 4.5).abs() < 1e-6);
        assert_eq!(report.reference_time, TimePoint(5));
        assert_eq!(report.alpha, 0.05);
    }

    #[test]
    fn legs_follow_the_route() {
        let (nodes, edges) = bypass();
        let p = Planner::new(PlannerConfig::default(), jam_at_2());
        let (_, report) = p.plan_route_with_report(&nodes, &edges, s(1), s(4), TimePoint(0), Some(0.0)).unwrap();
        let report = report.unwrap();
        assert_eq!(report.path, vec![s(1), s(2), s(4)]);
        assert_eq!(report.legs.len(), 2);
        assert_eq!(report.legs[0].avg_flow, 50.0);
        assert_eq!(report.legs[0].level, CongestionLevel::Moderate);
        assert_eq!(report.legs[1].from, s(2));
        assert_eq!(report.legs[1].to, s(4));
        assert!((report.total_cost - report.total_distance_km).abs() < 1e-9);
        assert_eq!(report.worst_leg().map(|l| l.avg_flow), Some(50.0));

        let text = report.to_string();
        assert!(text.contains("2 legs"));
        assert!(text.contains("moderate"));
    }

    #[test]
    fn no_report_without_route() {
        let nodes = vec![NodeRecord::new(1, 0.0, 0.0), NodeRecord::new(2, 1.0, 1.0), NodeRecord::new(3, 2.0, 2.0)];
        let p = Planner::new(PlannerConfig::default(), Arc::new(ConstantOracle(1.0)));
        let (out, report) = p
            .plan_route_with_report(&nodes, &[EdgeRecord::new(1, 2)], s(1), s(3), TimePoint(0), None)
            .unwrap();
        assert!(matches!(out, PlanOutcome::NoPath { .. }));
        assert!(report.is_none());
    }

    #[test]
    fn report_json() {
        let (nodes, edges) = single_edge();
        let p = Planner::new(PlannerConfig::default(), Arc::new(ConstantOracle(45.0)));
        let (_, report) = p.plan_route_with_report(&nodes, &edges, s(1), s(2), TimePoint(0), None).unwrap();
        let v = serde_json::to_value(report.unwrap()).unwrap();
        assert_eq!(v["path"], serde_json::json!([1, 2]));
        assert_eq!(v["legs"][0]["level"], "moderate");
        assert_eq!(v["legs"][0]["avgFlow"], 45.0);
        assert!(v["totalDistanceKm"].as_f64().unwrap() > 2.99);
    }
}
