//! End-to-end runs of the pipeline with stand-in route finders.

use retromix::commands::run::execute_with;
use retromix::config::Config;
use retromix::fs::{read_report, read_route_cache, write_route_cache};
use retromix::models::constants::{
    AIZ_ROUTES_CACHE, NOVEL_TEMPLATES_FILE, OVERLOOKED_TEMPLATES_FILE, POPULAR_TEMPLATES_FILE,
    POS_ROUTES_CACHE, UNUSED_TEMPLATES_FILE,
};
use retromix::models::{RouteSet, ScoringType};
use tempfile::TempDir;

use super::helpers::{
    linear_route, options, write_config, write_library, write_targets, FailingFinder,
    RecordingFinder, LIBRARY,
};

const NOVEL: &str = "[O:1]-[CH3]>>[O:1]";

fn aiz_routes() -> RouteSet {
    let mut set = RouteSet::new();
    set.push(
        "CCO",
        vec![
            linear_route("CCO", &[(LIBRARY[0], "A", true), (LIBRARY[1], "B", true)]),
            linear_route("CCO", &[(LIBRARY[0], "A", true)]),
        ],
    );
    set.push("c1ccccc1O", vec![linear_route("c1ccccc1O", &[(LIBRARY[2], "C", true)])]);
    set
}

fn pos_routes() -> RouteSet {
    let mut set = RouteSet::new();
    set.push(
        "CCO",
        vec![
            linear_route("CCO", &[(LIBRARY[3], "D", true)]),
            linear_route("CCO", &[(NOVEL, "E", false)]),
        ],
    );
    set.push(
        "c1ccccc1O",
        vec![linear_route("c1ccccc1O", &[(LIBRARY[0], "A", true), (NOVEL, "F", true)])],
    );
    set
}

/// Writes targets, library and config into `dir` and returns the loaded config.
fn setup(dir: &std::path::Path, extra_config: &str) -> Config {
    write_targets(dir, &["CCO", "", "c1ccccc1O"]);
    let library = write_library(dir, LIBRARY);
    let config = write_config(dir, &library, extra_config);
    Config::load(&config).expect("Failed to load config")
}

#[test]
fn test_first_run_queries_finders_and_writes_four_reports() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path(), "");
    let opts = options(temp.path(), ScoringType::Frequency);
    let aiz = RecordingFinder::new("aizynthfinder", aiz_routes());
    let pos = RecordingFinder::new("postera", pos_routes());

    let report = execute_with(&opts, &config, &aiz, &pos).unwrap();

    assert_eq!(aiz.calls.get(), 1);
    assert_eq!(pos.calls.get(), 1);
    assert_eq!(*aiz.last_targets.borrow(), vec!["CCO", "c1ccccc1O"]);

    assert_eq!(report.popular, vec![LIBRARY[0]]);
    assert_eq!(report.unused, vec![NOVEL, LIBRARY[3]]);
    assert_eq!(report.overlooked, vec![LIBRARY[3]]);
    assert_eq!(report.novel, vec![NOVEL]);

    let out = temp.path().join("out");
    assert_eq!(read_report(&out.join(POPULAR_TEMPLATES_FILE)).unwrap(), report.popular);
    assert_eq!(read_report(&out.join(UNUSED_TEMPLATES_FILE)).unwrap(), report.unused);
    assert_eq!(read_report(&out.join(OVERLOOKED_TEMPLATES_FILE)).unwrap(), report.overlooked);
    assert_eq!(read_report(&out.join(NOVEL_TEMPLATES_FILE)).unwrap(), report.novel);

    assert_eq!(read_route_cache(&out.join(AIZ_ROUTES_CACHE)).unwrap(), aiz_routes());
    assert_eq!(read_route_cache(&out.join(POS_ROUTES_CACHE)).unwrap(), pos_routes());
}

#[test]
fn test_second_run_reuses_caches_unchanged() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path(), "");
    let opts = options(temp.path(), ScoringType::Frequency);
    let aiz = RecordingFinder::new("aizynthfinder", aiz_routes());
    let pos = RecordingFinder::new("postera", pos_routes());
    let first = execute_with(&opts, &config, &aiz, &pos).unwrap();

    let out = temp.path().join("out");
    let aiz_cache = std::fs::read(out.join(AIZ_ROUTES_CACHE)).unwrap();
    let pos_cache = std::fs::read(out.join(POS_ROUTES_CACHE)).unwrap();

    let second = execute_with(&opts, &config, &FailingFinder, &FailingFinder).unwrap();

    assert_eq!(second, first);
    assert_eq!(std::fs::read(out.join(AIZ_ROUTES_CACHE)).unwrap(), aiz_cache);
    assert_eq!(std::fs::read(out.join(POS_ROUTES_CACHE)).unwrap(), pos_cache);
}

#[test]
fn test_each_cache_is_checked_independently() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path(), "");
    let opts = options(temp.path(), ScoringType::Frequency);
    write_route_cache(&opts.output.join(AIZ_ROUTES_CACHE), &aiz_routes()).unwrap();
    let pos = RecordingFinder::new("postera", pos_routes());

    let report = execute_with(&opts, &config, &FailingFinder, &pos).unwrap();

    assert_eq!(pos.calls.get(), 1);
    assert_eq!(report.novel, vec![NOVEL]);
}

#[test]
fn test_finder_failure_aborts_without_reports() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path(), "");
    let opts = options(temp.path(), ScoringType::State);

    let err = execute_with(&opts, &config, &FailingFinder, &FailingFinder).unwrap_err();

    assert!(format!("{err:#}").contains("route search failed"));
    assert!(!opts.output.join(AIZ_ROUTES_CACHE).exists());
    assert!(!opts.output.join(POPULAR_TEMPLATES_FILE).exists());
}

/// Two single-step routes: a cheap one using `cheap`, a dear one using `dear`.
fn priced_routes(cheap: &str, dear: &str) -> RouteSet {
    let mut set = RouteSet::new();
    set.push(
        "CCO",
        vec![
            linear_route("CCO", &[(cheap, "2", true)]),
            linear_route("CCO", &[(dear, "90", true)]),
        ],
    );
    set
}

#[test]
fn test_cost_scoring_ranks_by_stock_price() {
    let temp = TempDir::new().unwrap();
    let stock = temp.path().join("stock.tsv");
    std::fs::write(&stock, "inchi_key\tprice\n2\t5.0\n90\t10.0\n90\t100.0\n").unwrap();
    let config = setup(
        temp.path(),
        &format!("stock: {}\nanalysis:\n  popular_fraction: 0.5\n", stock.display()),
    );
    // LIBRARY[0] sorts first, so a frequency tie picks the dear template.
    let routes = priced_routes(LIBRARY[1], LIBRARY[0]);

    let by_frequency = execute_with(
        &options(temp.path(), ScoringType::Frequency),
        &config,
        &RecordingFinder::new("aizynthfinder", routes.clone()),
        &RecordingFinder::new("postera", RouteSet::new()),
    )
    .unwrap();
    assert_eq!(by_frequency.popular, vec![LIBRARY[0]]);

    let cost_dir = TempDir::new().unwrap();
    let mut opts = options(temp.path(), ScoringType::Cost);
    opts.output = cost_dir.path().join("out");
    let by_cost = execute_with(
        &opts,
        &config,
        &RecordingFinder::new("aizynthfinder", routes),
        &RecordingFinder::new("postera", RouteSet::new()),
    )
    .unwrap();
    assert_eq!(by_cost.popular, vec![LIBRARY[1]]);
    assert!(by_cost.unused.is_empty());
}

#[test]
fn test_cost_scoring_without_stock_fails_before_any_work() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path(), "");
    let opts = options(temp.path(), ScoringType::Cost);
    let aiz = RecordingFinder::new("aizynthfinder", aiz_routes());

    let err = execute_with(&opts, &config, &aiz, &FailingFinder).unwrap_err();

    assert!(err.to_string().contains("stock"));
    assert_eq!(aiz.calls.get(), 0);
    assert!(!opts.output.exists());
}

#[cfg(unix)]
#[test]
fn test_coprinet_scoring_uses_predicted_prices() {
    let temp = TempDir::new().unwrap();
    // `cat` stands in for CoPriNet: the leaf "SMILES" are the prices.
    let config = setup(
        temp.path(),
        "coprinet_command: [cat]\nanalysis:\n  popular_fraction: 0.5\n",
    );

    let report = execute_with(
        &options(temp.path(), ScoringType::Coprinet),
        &config,
        &RecordingFinder::new("aizynthfinder", priced_routes(LIBRARY[1], LIBRARY[0])),
        &RecordingFinder::new("postera", RouteSet::new()),
    )
    .unwrap();

    assert_eq!(report.popular, vec![LIBRARY[1]]);
}

#[test]
fn test_state_scoring_prefers_routes_ending_in_stock() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path(), "analysis:\n  popular_fraction: 0.5\n");
    let mut routes = RouteSet::new();
    routes.push(
        "CCO",
        vec![
            linear_route("CCO", &[(LIBRARY[0], "A", false)]),
            linear_route("CCO", &[(LIBRARY[1], "B", true)]),
        ],
    );

    let report = execute_with(
        &options(temp.path(), ScoringType::State),
        &config,
        &RecordingFinder::new("aizynthfinder", routes),
        &RecordingFinder::new("postera", RouteSet::new()),
    )
    .unwrap();

    assert_eq!(report.popular, vec![LIBRARY[1]]);
}

#[test]
fn test_hdf5_route_cache_stops_the_run() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path(), "");
    let opts = options(temp.path(), ScoringType::Frequency);
    std::fs::create_dir_all(&opts.output).unwrap();
    std::fs::write(opts.output.join("aiz_routes.hdf5"), b"\x89HDF\r\n\x1a\n").unwrap();

    let err = execute_with(&opts, &config, &FailingFinder, &FailingFinder).unwrap_err();

    assert!(format!("{err:#}").contains("aiz_routes.hdf5"));
    assert!(!opts.output.join(AIZ_ROUTES_CACHE).exists());
    assert!(!opts.output.join(POPULAR_TEMPLATES_FILE).exists());
}

/// Stand-in for aizynthcli: one output row per input line, each with a single
/// one-step route applying library template 0.
#[cfg(unix)]
const FAKE_AIZYNTHCLI: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
    case "$1" in
        --smiles) smiles="$2"; shift ;;
        --output) output="$2"; shift ;;
    esac
    shift
done
{
    printf '{"data": ['
    sep=''
    while IFS= read -r line; do
        printf '%s{"target": "%s", "trees": [{"type": "mol", "smiles": "%s", "children": [{"type": "reaction", "smiles": "A>>%s", "metadata": {"template_code": 0}, "children": [{"type": "mol", "smiles": "A", "in_stock": true}]}]}]}' "$sep" "$line" "$line" "$line"
        sep=','
    done < "$smiles"
    printf ']}'
} > "$output"
"#;

#[cfg(unix)]
#[test]
fn test_duplicated_target_keeps_one_route_per_aizynthcli_row() {
    use retromix::finders::AizRouteFinder;
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let config = setup(temp.path(), "");
    write_targets(temp.path(), &["CCO", "c1ccccc1O", "CCO"]);

    let script = temp.path().join("aizynthcli");
    std::fs::write(&script, FAKE_AIZYNTHCLI).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    let aiz = AizRouteFinder::new(
        script.display().to_string(),
        config.aizynthfinder_config.clone(),
        1,
    );

    let opts = options(temp.path(), ScoringType::Frequency);
    let report = execute_with(
        &opts,
        &config,
        &aiz,
        &RecordingFinder::new("postera", RouteSet::new()),
    )
    .unwrap();

    let cached = read_route_cache(&opts.output.join(AIZ_ROUTES_CACHE)).unwrap();
    let order: Vec<_> = cached.iter().map(|e| e.target.as_str()).collect();
    assert_eq!(order, vec!["CCO", "c1ccccc1O"]);
    assert_eq!(cached.get("CCO").unwrap().len(), 2);
    assert_eq!(cached.route_count(), 3);
    assert_eq!(report.popular, vec![LIBRARY[0]]);
}
