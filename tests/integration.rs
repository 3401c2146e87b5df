use std::{cell::RefCell, rc::Rc, str::from_utf8};

use mini_ledger::bin_utils::{ScenarioError, Service};

const TEST_FILE: &str = include_str!("scenario.csv");

fn find<'a>(rows: &'a [Vec<&'a str>], column: usize, value: &str) -> &'a [&'a str] {
    rows.iter()
        .find(|row| row[column] == value)
        .unwrap_or_else(|| panic!("no row with {value} in column {column}"))
}

#[test]
fn replay_scenario() {
    let mut output = Vec::new();
    let failures = Rc::new(RefCell::new(Vec::new()));
    let sink = failures.clone();
    let service = Service {
        input: TEST_FILE.as_bytes(),
        output: &mut output,
        error_printer: Box::new(move |line, err| sink.borrow_mut().push((line, err))),
    };
    service.run().unwrap();

    let failures = failures.borrow();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].0, 6);
    assert!(
        failures[0]
            .1
            .to_string()
            .contains("Insufficient balance"),
        "{}",
        failures[0].1
    );
    assert_eq!(failures[1].0, 9);
    assert!(matches!(failures[1].1, ScenarioError::Dispatch(_)));

    let text = from_utf8(&output).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("address,account,balance,nonce,l1_address")
    );
    let rows: Vec<Vec<&str>> = lines.map(|line| line.split(',').collect()).collect();
    assert_eq!(rows.len(), 4);

    let first = find(&rows, 1, "1");
    assert_eq!(first[2], "555");
    assert_eq!(first[3], "5");
    assert_eq!(
        first[4].to_lowercase(),
        "0x1f9840a85d5af5bf1d1762f925badddc4201f984"
    );

    // failed calls still consume their nonce
    let second = find(&rows, 1, "2");
    assert_eq!(second[2], "0");
    assert_eq!(second[3], "3");
    assert_eq!(
        second[4].to_lowercase(),
        "0xd9e1ce17f2641f24ae83637ab66a2cca9c378b9f"
    );

    assert_eq!(find(&rows, 0, "0x7b"), ["0x7b", "", "100", "", ""]);
    assert_eq!(find(&rows, 0, "0x3db"), ["0x3db", "", "345", "", ""]);
}

#[test]
fn bad_arguments_are_reported() {
    let input = "account,contract,entrypoint,args\n\
                 1,token,initialize,\n\
                 1,token,transfer,@x 5\n\
                 1,token,transfer,zzz 5\n";
    let mut output = Vec::new();
    let failures = Rc::new(RefCell::new(Vec::new()));
    let sink = failures.clone();
    let service = Service {
        input: input.as_bytes(),
        output: &mut output,
        error_printer: Box::new(move |line, err| sink.borrow_mut().push((line, err))),
    };
    service.run().unwrap();

    let failures = failures.borrow();
    assert_eq!(failures.len(), 2);
    assert!(matches!(&failures[0], (3, ScenarioError::BadArgument(arg)) if arg == "@x"));
    assert!(matches!(&failures[1], (4, ScenarioError::BadArgument(arg)) if arg == "zzz"));

    // rejected before signing, so only `initialize` consumed a nonce
    let text = from_utf8(&output).unwrap();
    let row: Vec<&str> = text.lines().nth(1).unwrap().split(',').collect();
    assert_eq!(row[1..4], ["1", "1000", "1"]);
}
