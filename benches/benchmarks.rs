//! Performance benchmarks for setuplens

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use setuplens::test_utils::TestProject;
use setuplens::{
    DiscoverConfig, PackageDescriptor, ScanConfig, discover, extract_dependencies,
    parse_requirements, pin_descriptor, scan_all,
};

const ALL_VARIATIONS: &str = include_str!("../tests/fixtures/all_dep_variations.py");
const NO_DEP_FOUND: &str = include_str!("../tests/fixtures/no_dep_found.py");
const REQUIREMENTS: &str = include_str!("../tests/fixtures/setup_and_requirements/requirements.txt");

/// A descriptor with `count` dependencies and some surrounding noise.
fn large_descriptor(count: usize) -> String {
    let mut src = String::from("import os\nfrom setuptools import setup, find_packages\n\n");
    src.push_str("here = os.path.abspath(os.path.dirname(__file__))\n");
    src.push_str("with open(os.path.join(here, 'README.md')) as f:\n    long_description = f.read()\n\n");
    src.push_str("setup(\n    name='big',\n    packages=find_packages(exclude=['tests']),\n    install_requires=[\n");
    for i in 0..count {
        src.push_str(&format!("        'package-{}>={}.0,<{}.0',  # dep {}\n", i, i, i + 1, i));
    }
    src.push_str("    ],\n)\n");
    src
}

fn create_workspace(project_count: usize) -> TestProject {
    let project = TestProject::new();
    for i in 0..project_count {
        let dir = format!("services/svc{}", i);
        if i % 2 == 0 {
            project.add_inline_project(&dir, &format!("svc{}", i), &["click>=8", "rich", "httpx[http2]"]);
        } else {
            project.add_external_project(&dir, &format!("svc{}", i), &["flask", "gunicorn==22.0.0"]);
        }
    }
    project
}

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_dependencies");

    group.bench_function("fixture_inline", |b| {
        b.iter(|| extract_dependencies(black_box(ALL_VARIATIONS)))
    });

    group.bench_function("fixture_external", |b| {
        b.iter(|| PackageDescriptor::parse(black_box(NO_DEP_FOUND)))
    });

    let large = large_descriptor(500);
    group.bench_function("inline_500", |b| {
        b.iter(|| extract_dependencies(black_box(&large)))
    });

    group.finish();
}

fn bench_requirements(c: &mut Criterion) {
    let large: String = (0..1000)
        .map(|i| format!("package-{}=={}.0.0  # pinned\n", i, i))
        .collect();

    let mut group = c.benchmark_group("parse_requirements");
    group.bench_function("fixture", |b| {
        b.iter(|| parse_requirements(black_box(REQUIREMENTS)))
    });
    group.bench_function("lines_1000", |b| {
        b.iter(|| parse_requirements(black_box(&large)))
    });
    group.finish();
}

fn bench_pin(c: &mut Criterion) {
    let large = large_descriptor(500);
    c.bench_function("pin_descriptor_500", |b| {
        b.iter(|| pin_descriptor(black_box(&large), "package-250", "250.1"))
    });
}

fn bench_scan(c: &mut Criterion) {
    let workspace = create_workspace(50);
    let projects = discover(workspace.path(), &DiscoverConfig::default()).unwrap();

    let mut group = c.benchmark_group("scan");
    group.bench_function("discover_50_projects", |b| {
        b.iter(|| discover(black_box(workspace.path()), &DiscoverConfig::default()))
    });
    for workers in [1, 0] {
        let config = ScanConfig {
            parallel_workers: workers,
            ..Default::default()
        };
        let name = if workers == 1 { "sequential" } else { "parallel" };
        group.bench_function(name, |b| b.iter(|| scan_all(black_box(&projects), &config)));
    }
    group.finish();
}

criterion_group!(benches, bench_extraction, bench_requirements, bench_pin, bench_scan);
criterion_main!(benches);
