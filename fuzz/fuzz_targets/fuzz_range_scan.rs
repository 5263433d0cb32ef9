#![no_main]

use arbitrary::Arbitrary;
use kvdb::{scan_range, Engine, MemoryEngine};
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeMap;

#[derive(Arbitrary, Debug)]
enum Op {
    Put { key: String, value: String },
    Get { key: String },
    Range { begin: String, end: String },
}

fuzz_target!(|ops: Vec<Op>| {
    let mut engine = MemoryEngine::new();
    let mut reference = BTreeMap::new();

    for op in ops.iter().take(200) {
        match op {
            Op::Put { key, value } => {
                engine.put(key, value).unwrap();
                reference.insert(key.clone(), value.clone());
            }
            Op::Get { key } => {
                assert_eq!(engine.get(key).unwrap(), reference.get(key).cloned());
            }
            Op::Range { begin, end } => {
                let items = scan_range(&engine, begin, end).unwrap();
                let expected: Vec<(String, String)> = if begin < end {
                    reference
                        .range(begin.clone()..end.clone())
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect()
                } else {
                    Vec::new()
                };
                let got: Vec<(String, String)> =
                    items.into_iter().map(|item| item.into_parts()).collect();
                assert_eq!(got, expected);
            }
        }
    }
});
