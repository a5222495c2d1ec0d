//! secp256k1 field and scalar arithmetic benchmarks

use criterion::{
    black_box, criterion_group, criterion_main, measurement::Measurement, BenchmarkGroup,
    Criterion,
};
use hex_literal::hex;
use secp256k1_core::{arithmetic::lincomb, FieldElement, ProjectivePoint, Scalar};

fn test_field_element_x() -> FieldElement {
    FieldElement::from_bytes(&hex!(
        "bb488aef416a41d7680d1cf01d70f59b60d7f5f77e30e78b8bf9d2d882f156a6"
    ))
    .unwrap()
}

fn test_field_element_y() -> FieldElement {
    FieldElement::from_bytes(&hex!(
        "67e2f68071ed8281e8aed6bcf1c5207c5e633722d920afd6ae22d06eeb8035e3"
    ))
    .unwrap()
}

fn test_scalar_x() -> Scalar {
    Scalar::from_bytes(&hex!(
        "bb488aef416a41d7680d1cf01d70f59b60d7f5f77e30e78b8bf9d2d882f156a6"
    ))
    .unwrap()
}

fn test_scalar_y() -> Scalar {
    Scalar::from_bytes(&hex!(
        "67e2f68071ed8281e8aed6bcf1c5207c5e633722d920afd6ae22d06eeb8035e3"
    ))
    .unwrap()
}

fn bench_field_element<'a, M: Measurement>(group: &mut BenchmarkGroup<'a, M>) {
    let x = test_field_element_x();
    let y = test_field_element_y();

    group.bench_function("normalize_weak", |b| {
        b.iter(|| black_box(x).normalize_weak())
    });
    group.bench_function("normalize", |b| b.iter(|| black_box(x).normalize()));
    group.bench_function("mul", |b| b.iter(|| &black_box(x) * &black_box(y)));
    group.bench_function("square", |b| b.iter(|| black_box(x).square()));
    group.bench_function("invert", |b| b.iter(|| black_box(x).invert().unwrap()));
    group.bench_function("sqrt", |b| b.iter(|| black_box(x).sqrt().unwrap()));
}

fn bench_scalar<'a, M: Measurement>(group: &mut BenchmarkGroup<'a, M>) {
    let x = test_scalar_x();
    let y = test_scalar_y();

    group.bench_function("add", |b| b.iter(|| &black_box(x) + &black_box(y)));
    group.bench_function("sub", |b| b.iter(|| &black_box(x) - &black_box(y)));
    group.bench_function("mul", |b| b.iter(|| &black_box(x) * &black_box(y)));
    group.bench_function("negate", |b| b.iter(|| -black_box(x)));
    group.bench_function("invert", |b| b.iter(|| black_box(x).invert().unwrap()));
}

fn bench_point<'a, M: Measurement>(group: &mut BenchmarkGroup<'a, M>) {
    let p = ProjectivePoint::GENERATOR;
    let m = hex!("AA5E28D6A97A2479A65527F7290311A3624D4CC0FA1578598EE3C2613BF99522");
    let s = Scalar::from_bytes(&m).unwrap();

    group.bench_function("point-scalar mul", |b| {
        b.iter(|| &black_box(p) * &black_box(s))
    });
    group.bench_function("lincomb", |b| {
        b.iter(|| {
            lincomb(
                &black_box(p),
                &black_box(s),
                &black_box(p),
                &black_box(s),
            )
        })
    });
}

fn bench_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("field element operations");
    bench_field_element(&mut group);
    group.finish();

    let mut group = c.benchmark_group("scalar operations");
    bench_scalar(&mut group);
    group.finish();

    let mut group = c.benchmark_group("point operations");
    bench_point(&mut group);
    group.finish();
}

criterion_group!(benches, bench_arithmetic);
criterion_main!(benches);
