// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{add, d, expense, income, setup};
use pennywise::LedgerError;
use pennywise::listing::{ListFilter, list_transactions};
use pennywise::models::TxType;
use pennywise::period::DateRange;
use pennywise::store;
use std::collections::HashSet;

fn ids(page: &pennywise::listing::TransactionPage) -> Vec<i64> {
    page.transactions().map(|t| t.id).collect()
}

#[test]
fn pages_are_disjoint_and_contiguous() {
    let mut conn = setup();
    for day in 1..=5 {
        add(&mut conn, expense("1", "Food", &format!("2024-03-0{}", day)));
    }
    let all = list_transactions(&conn, 1, 100, &ListFilter::default()).unwrap();
    assert!(!all.has_more);
    let everything = ids(&all);
    assert_eq!(everything.len(), 5);

    let p1 = list_transactions(&conn, 1, 2, &ListFilter::default()).unwrap();
    let p2 = list_transactions(&conn, 2, 2, &ListFilter::default()).unwrap();
    let p3 = list_transactions(&conn, 3, 2, &ListFilter::default()).unwrap();
    assert!(p1.has_more);
    assert!(p2.has_more);
    assert!(!p3.has_more);
    assert_eq!(p3.len(), 1);

    let a: HashSet<i64> = ids(&p1).into_iter().collect();
    let b: HashSet<i64> = ids(&p2).into_iter().collect();
    assert!(a.is_disjoint(&b));

    let mut joined = ids(&p1);
    joined.extend(ids(&p2));
    joined.extend(ids(&p3));
    assert_eq!(joined, everything);
    assert_eq!(p1.days[0].date, d("2024-03-05"));
}

#[test]
fn has_more_false_when_rows_fill_page_exactly() {
    let mut conn = setup();
    for day in 1..=4 {
        add(&mut conn, expense("1", "Food", &format!("2024-03-0{}", day)));
    }
    let p2 = list_transactions(&conn, 2, 2, &ListFilter::default()).unwrap();
    assert_eq!(p2.len(), 2);
    assert!(!p2.has_more);
    let p3 = list_transactions(&conn, 3, 2, &ListFilter::default()).unwrap();
    assert!(p3.is_empty());
    assert!(!p3.has_more);
}

#[test]
fn same_day_rows_group_newest_first() {
    let mut conn = setup();
    let first = add(&mut conn, expense("1", "Food", "2024-03-01"));
    let second = add(&mut conn, expense("2", "Food", "2024-03-01"));
    let later = add(&mut conn, expense("3", "Food", "2024-03-02"));
    let page = list_transactions(&conn, 1, 10, &ListFilter::default()).unwrap();
    assert_eq!(page.days.len(), 2);
    assert_eq!(page.days[0].date, d("2024-03-02"));
    assert_eq!(page.days[0].transactions[0].id, later);
    let day_one: Vec<i64> = page.days[1].transactions.iter().map(|t| t.id).collect();
    assert_eq!(day_one, vec![second, first]);
}

#[test]
fn refunded_rows_stay_listed() {
    let mut conn = setup();
    let id = add(&mut conn, expense("9", "Food", "2024-03-01").refunded(true));
    let page = list_transactions(&conn, 1, 10, &ListFilter::default()).unwrap();
    assert_eq!(ids(&page), vec![id]);
    assert!(page.days[0].transactions[0].refunded);
}

#[test]
fn filters_narrow_the_listing() {
    let mut conn = setup();
    let food = store::add_tag(&conn, "food", None).unwrap();
    let trip = store::add_tag(&conn, "trip", None).unwrap();
    let alex = store::add_member(&conn, "Alex", None).unwrap();
    let lunch = add(
        &mut conn,
        expense("12", "Food", "2024-03-01")
            .with_tags(&[food])
            .with_note("Team LUNCH"),
    );
    let train = add(
        &mut conn,
        expense("30", "Transport", "2024-03-10")
            .with_tags(&[trip])
            .with_member(alex),
    );
    let pay = add(&mut conn, income("500", "Salary", "2024-04-01"));

    let run = |filter: ListFilter| ids(&list_transactions(&conn, 1, 10, &filter).unwrap());

    assert_eq!(
        run(ListFilter {
            r#type: Some(TxType::Income),
            ..Default::default()
        }),
        vec![pay]
    );
    assert_eq!(
        run(ListFilter {
            member_ids: vec![alex],
            ..Default::default()
        }),
        vec![train]
    );
    assert_eq!(
        run(ListFilter {
            tag_ids: vec![food, trip],
            ..Default::default()
        }),
        vec![train, lunch]
    );
    assert_eq!(
        run(ListFilter {
            category: Some("Food".into()),
            ..Default::default()
        }),
        vec![lunch]
    );
    assert_eq!(
        run(ListFilter {
            search: Some("lunch".into()),
            ..Default::default()
        }),
        vec![lunch]
    );
    assert_eq!(
        run(ListFilter {
            date_range: Some(DateRange::new(d("2024-03-05"), d("2024-03-31")).unwrap()),
            ..Default::default()
        }),
        vec![train]
    );
    assert_eq!(
        run(ListFilter {
            date_range: DateRange::open(Some(d("2024-03-05")), None).unwrap(),
            ..Default::default()
        }),
        vec![pay, train]
    );
}

#[test]
fn zero_page_is_rejected() {
    let conn = setup();
    assert!(matches!(
        list_transactions(&conn, 0, 10, &ListFilter::default()),
        Err(LedgerError::InvalidPage(_))
    ));
    assert!(matches!(
        list_transactions(&conn, 1, 0, &ListFilter::default()),
        Err(LedgerError::InvalidPage(_))
    ));
}

#[test]
fn oversized_pages_are_rejected() {
    let mut conn = setup();
    add(&mut conn, expense("1", "Food", "2024-03-01"));
    assert!(matches!(
        list_transactions(&conn, 1, usize::MAX, &ListFilter::default()),
        Err(LedgerError::InvalidPage(_))
    ));
    assert!(matches!(
        list_transactions(&conn, 3, usize::MAX / 2, &ListFilter::default()),
        Err(LedgerError::InvalidPage(_))
    ));
    let far = list_transactions(&conn, 1_000_000, 1_000, &ListFilter::default()).unwrap();
    assert!(far.is_empty());
    assert!(!far.has_more);
}
