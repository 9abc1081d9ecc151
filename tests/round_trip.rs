use std::io::Cursor;

use paramdb::{Overwrite, Store};

const SOURCE: &str = "\
# detector parameters
pi     3.14159265358979312
model  INCL++
e      2.71828182845904509e+00  This is 'e' as in exp(1), not the e+ charge.
q_e    1.60217646200000007e-19 coulomb
flag
big    6.43e20

=geo= id x y z
10  1.0   0.0  1.0
11 -0.5 0.866  1.0

=shapes= id shape
1 round
";

fn load(text: &str) -> Store {
    let mut store = Store::new();
    store.read_stream(Cursor::new(text), None, Overwrite::Keep).expect("load");
    store
}

fn dump(store: &Store) -> String {
    let mut out = Vec::new();
    store.write_text(&mut out).expect("write");
    String::from_utf8(out).expect("utf8")
}

fn close(a: f64, b: f64) -> bool {
    a == b || ((a - b) / a).abs() < 1e-14
}

#[test]
fn scalar_lines_follow_key_order() {
    let store = load("pi 3.14159\nmodel INCL++\nq_e 1.602176462e-19 coulomb\nflag\nlabel : text only\n");
    let text = dump(&store);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        [
            "pi 3.14159",
            "model 0 : INCL++",
            "q_e 1.602176462e-19 : coulomb",
            "flag",
            "label : text only",
        ]
    );
}

#[test]
fn dump_reloads_to_same_values() {
    let original = load(SOURCE);
    let reloaded = load(&dump(&original));

    for key in original.keys() {
        assert_eq!(original.has_num_value(key), reloaded.has_num_value(key), "{key}");
        if let Ok(number) = original.num_value(key) {
            assert!(close(number, reloaded.num_value(key).unwrap()), "{key}");
        }
        assert_eq!(original.str_value(key).unwrap(), reloaded.str_value(key).unwrap(), "{key}");
    }
    assert_eq!(original.keys(), reloaded.keys());
}

#[test]
fn tables_survive_a_dump() {
    let original = load(SOURCE);
    let text = dump(&original);
    assert!(text.contains("\n=geo=\tid\tx\ty\tz\n\t0\t1.0\t0.0\t1.0\n\t1\t-0.5\t0.866\t1.0\n"), "{text}");

    let reloaded = load(&text);
    for table in original.tables() {
        let copy = reloaded.table(table.name()).expect("table");
        assert_eq!(copy.rows(), table.rows());
        assert_eq!(copy.column_names(), table.column_names());
        for name in table.column_names() {
            assert_eq!(copy.column(name).unwrap(), table.column(name).unwrap());
        }
    }
    assert_eq!(reloaded.num_value("geo").unwrap(), 2.0);
}

#[test]
fn prefixed_keys_do_not_reload_as_written() {
    let mut store = Store::new();
    store
        .read_stream(Cursor::new("gain 2.5\n"), Some("det"), Overwrite::Keep)
        .unwrap();
    let text = dump(&store);
    assert_eq!(text, "det.gain 2.5\n");

    let reloaded = load(&text);
    assert_eq!(reloaded.keys(), ["det"]);
    assert_eq!(reloaded.num_value("det").unwrap(), 0.0);
    assert_eq!(reloaded.str_value("det").unwrap(), ".gain 2.5");
}
