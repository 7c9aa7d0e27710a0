use criterion::{criterion_group, criterion_main, Criterion};
use opencc_chain::dictionary_lib::{Dict, TextDict, TrieDict};
use opencc_chain::ProfileLoader;
use std::hint::black_box;
use std::path::Path;
use std::time::Duration;

const DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

fn loader() -> ProfileLoader {
    ProfileLoader::new().with_search_path(DATA_DIR)
}

fn bench_convert_s2t_100k(c: &mut Criterion) {
    let input = "汉字转换头发干燥以后网络鼠标键盘龙马精神的测试文字".repeat(4000); // ~100,000 characters
    let converter = loader().open("s2t").unwrap();

    c.bench_function("convert_s2t_100k", |b| {
        b.iter(|| converter.convert(black_box(&input)));
    });
}

fn bench_convert_s2twp_100k(c: &mut Criterion) {
    let input = "汉字转换头发干燥以后网络鼠标键盘龙马精神的测试文字".repeat(4000);
    let converter = loader().open("s2twp").unwrap();

    c.bench_function("convert_s2twp_100k", |b| {
        b.iter(|| converter.convert(black_box(&input)));
    });
}

fn bench_match_prefix_text_vs_trie(c: &mut Criterion) {
    let text = TextDict::load(Path::new(DATA_DIR).join("STCharacters.txt")).unwrap();
    let trie = TrieDict::from_lexicon(text.lexicon()).unwrap();
    let input = "俨骖𬴂于上路，访风景于崇阿".repeat(1000);
    let starts: Vec<usize> = input.char_indices().map(|(i, _)| i).collect();

    let mut group = c.benchmark_group("match_prefix");
    group.bench_function("text", |b| {
        b.iter(|| starts.iter().filter(|&&s| text.match_prefix(&input, s).is_some()).count());
    });
    group.bench_function("trie", |b| {
        b.iter(|| starts.iter().filter(|&&s| trie.match_prefix(&input, s).is_some()).count());
    });
    group.finish();
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .warm_up_time(Duration::from_secs(3))
        .measurement_time(Duration::from_secs(5))
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = bench_convert_s2t_100k, bench_convert_s2twp_100k, bench_match_prefix_text_vs_trie
}
criterion_main!(benches);
