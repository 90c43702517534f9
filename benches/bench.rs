#[macro_use]
extern crate criterion;

use core::time::Duration;
use criterion::{black_box, BatchSize, Criterion, ParameterizedBenchmark, Throughput};

use bsondoc::{de, ser, DecoderSettings, Document, ObjectId};
use bsondoc::{Deserialize as DocDeserialize, Serialize as DocSerialize};
use serde_derive::{Deserialize, Serialize};

const LEN: usize = 10_000;
const WARM_UP_TIME: Duration = Duration::from_secs(3);
const MEASUREMENT_TIME: Duration = Duration::from_secs(20);

fn input_struct() -> Catalog {
    let products = (0..500)
        .map(|i| Product {
            sku: format!("SKU-{:05}", i),
            name: format!("product number {}", i),
            price: i as f64 * 1.25,
            stock: i * 3,
            discontinued: i % 7 == 0,
            tags: vec!["tools".to_owned(), format!("batch-{}", i % 10)],
            note: if i % 3 == 0 { Some("restock soon".to_owned()) } else { None },
        })
        .collect();
    Catalog {
        owner: "warehouse".to_owned(),
        revision: 42,
        products,
    }
}

fn input_bin() -> Vec<u8> {
    ser::to_bin(&input_struct()).unwrap()
}

fn cmp(c: &mut Criterion) {
    let core_ids = core_affinity::get_core_ids().unwrap();
    core_affinity::set_for_current(core_ids[0]);

    c.bench("ser", ParameterizedBenchmark::new(
        "bin",
        |b, _| {
            b.iter_batched(
                || input_struct(),
                |value| black_box(ser::to_bin(&value).unwrap()),
                BatchSize::NumIterations(LEN as u64),
            )
        },
        vec![()],
    )
    .with_function("document", |b, _| {
        b.iter_batched(
            || input_struct(),
            |value| black_box(ser::to_document(&value).unwrap()),
            BatchSize::NumIterations(LEN as u64),
        )
    })
    .with_function("bson", |b, _| {
        b.iter_batched(
            || input_struct(),
            |value| {
                let mut out = vec![];
                bson::to_bson(&value)
                    .unwrap()
                    .as_document()
                    .unwrap()
                    .to_writer(&mut out)
                    .unwrap();
                black_box(out)
            },
            BatchSize::NumIterations(LEN as u64),
        )
    })
    .warm_up_time(WARM_UP_TIME)
    .measurement_time(MEASUREMENT_TIME));

    let settings = DecoderSettings::default();
    c.bench("de", ParameterizedBenchmark::new(
        "fast",
        |b, data| {
            b.iter_batched(
                || data,
                |value| black_box(de::from_bin::<Catalog>(value).unwrap()),
                BatchSize::NumIterations(LEN as u64),
            )
        },
        vec![input_bin()],
    )
    .with_function("general", move |b, data| {
        b.iter_batched(
            || data,
            |value| black_box(de::from_bin_with::<Catalog>(value, &settings).unwrap()),
            BatchSize::NumIterations(LEN as u64),
        )
    })
    .with_function("bson", |b, data| {
        b.iter_batched(
            || data,
            |value| {
                let doc = bson::Document::from_reader(&mut &value[..]).unwrap();
                black_box(bson::from_bson::<Catalog>(doc.into()).unwrap())
            },
            BatchSize::NumIterations(LEN as u64),
        )
    })
    .throughput(|d| Throughput::Bytes(d.len() as u64))
    .warm_up_time(WARM_UP_TIME)
    .measurement_time(MEASUREMENT_TIME));

    c.bench("document", ParameterizedBenchmark::new(
        "validate",
        |b, data| {
            b.iter_batched(
                || data.clone(),
                |value| black_box(Document::from_bytes(value).unwrap()),
                BatchSize::NumIterations(LEN as u64),
            )
        },
        vec![input_bin()],
    )
    .with_function("clone and write", |b, data| {
        let doc = Document::from_bytes(data.clone()).unwrap();
        b.iter_batched(
            || doc.clone(),
            |mut value| {
                value.insert("_id", ObjectId::new()).unwrap();
                black_box(value)
            },
            BatchSize::NumIterations(LEN as u64),
        )
    })
    .throughput(|d| Throughput::Bytes(d.len() as u64))
    .warm_up_time(WARM_UP_TIME)
    .measurement_time(MEASUREMENT_TIME));
}

criterion_group!(benches, cmp);
criterion_main!(benches);

#[derive(Serialize, DocSerialize, Deserialize, DocDeserialize)]
struct Catalog {
    owner: String,
    revision: i32,
    products: Vec<Product>,
}

#[derive(Serialize, DocSerialize, Deserialize, DocDeserialize)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    stock: u32,
    discontinued: bool,
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}
