//! Performance benchmarks for pmc-extract.
//!
//! Run with: `cargo bench`
//!
//! Benchmarks include:
//! - A small synthetic full-text record and article page for microbenchmarks
//! - The same record repeated to several sizes up to the 2 MiB ceiling

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pmc_extract::{methods_section, sanitize, Ruleset};

const SAMPLE_XML: &str = r#"<article><front><article-meta>
<title-group><article-title>Regulation of yeast growth</article-title></title-group>
<contrib-group><contrib><name><surname>Smith</surname><given-names>J</given-names></name></contrib></contrib-group>
<abstract><p>Growth is <italic>regulated</italic> by nutrients&#x2009;and stress.</p></abstract>
</article-meta></front><body>
<sec sec-type="intro"><title>Introduction</title><p>Budding yeast adapts its growth rate.</p></sec>
<sec sec-type="materials|methods"><title>Materials and Methods</title>
<sec><title>Strains</title><p>All strains are <bold>S288C</bold> derivatives.</p></sec>
<sec><title>Media</title><p>Cells were grown in YPD at 30 C <xref ref-type="bibr" rid="B1">1</xref>.</p></sec>
</sec>
<sec sec-type="results"><title>Results</title><p>Growth doubled.</p>
<fig id="F1"><label>Figure 1</label><caption><p>Growth curve.</p></caption><graphic xlink:href="f1.jpg"/></fig></sec>
</body><back><ref-list><ref id="B1"><element-citation><person-group><name><surname>Doe</surname></name></person-group>
<source>Yeast</source><year>2001</year></element-citation></ref></ref-list></back></article>
"#;

const SAMPLE_PAGE: &str = r#"<!DOCTYPE html>
<html><head><script>var x = 1;</script></head>
<body><table><tr><td class="sidebar-cell"><ul class="nav"><li>Journal List</li></ul></td>
<td valign="top" class="content-cell"><!-- banner -->
<div class="section-content"><p>Budding yeast adapts its growth rate.</p></div>
<div class="head1">Methods</div><p>All strains are S288C derivatives <a href="#E1">(1)</a>.</p>
<table class="t"><tr><td>value</td></tr></table>
<div class="ref-cit-blk" id="B1"><div class="ref-label">1.</div><div class="ref-cit">Doe. <a href="articlerender.fcgi?artid=1790863">Yeast</a></div></div>
<div class="footer-section">footer</td></tr></table></body></html>"#;

fn bench_structural_strip(c: &mut Criterion) {
    c.bench_function("structural_strip", |b| {
        b.iter(|| sanitize(black_box(SAMPLE_XML), Ruleset::StructuralStrip));
    });
}

fn bench_methods_section(c: &mut Criterion) {
    c.bench_function("methods_section", |b| {
        b.iter(|| methods_section(black_box(SAMPLE_XML)));
    });
}

fn bench_page_cleanup(c: &mut Criterion) {
    c.bench_function("page_cleanup", |b| {
        b.iter(|| sanitize(black_box(SAMPLE_PAGE), Ruleset::HtmlPageCleanup));
    });
}

/// Full-text records of growing size, up to the download ceiling
fn bench_record_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_size");
    group.sample_size(20);

    for copies in [1usize, 64, 1024] {
        let record = SAMPLE_XML.repeat(copies);
        let size_kb = record.len() / 1024;
        group.throughput(Throughput::Bytes(record.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("structural_strip", format!("{size_kb}KB")),
            &record,
            |b, record| {
                b.iter(|| sanitize(black_box(record), Ruleset::StructuralStrip));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("methods_section", format!("{size_kb}KB")),
            &record,
            |b, record| {
                b.iter(|| methods_section(black_box(record)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_structural_strip,
    bench_methods_section,
    bench_page_cleanup,
    bench_record_sizes
);
criterion_main!(benches);
