//! Property-based tests for the conversation store
//!
//! Drives the store with arbitrary operation sequences and checks the
//! selection, ordering and once-only field invariants after every step.

use super::*;
use crate::store::LocalStore;
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Create,
    /// Index into the current list; out of range picks an unknown id
    Select(usize),
    Delete(usize),
    Append {
        target: usize,
        count: usize,
        title: Option<String>,
        session: Option<String>,
    },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Create),
        2 => (0usize..8).prop_map(Op::Select),
        2 => (0usize..8).prop_map(Op::Delete),
        4 => (
            0usize..8,
            1usize..4,
            proptest::option::of("[a-z]{1,8}"),
            proptest::option::of("s[0-9]{1,3}"),
        )
            .prop_map(|(target, count, title, session)| Op::Append {
                target,
                count,
                title,
                session,
            }),
    ]
}

fn pick_id(store: &ConversationStore, index: usize) -> String {
    let convs = store.conversations();
    if index < convs.len() {
        convs[index].id.clone()
    } else {
        format!("unknown-{index}")
    }
}

fn new_store() -> ConversationStore {
    ConversationStore::load(LocalStore::open_in_memory().unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_current_is_none_or_present(ops in proptest::collection::vec(arb_op(), 0..40)) {
        let mut store = new_store();
        for op in ops {
            match op {
                Op::Create => { store.create_conversation(); }
                Op::Select(i) => { let id = pick_id(&store, i); store.select_conversation(&id); }
                Op::Delete(i) => { let id = pick_id(&store, i); store.delete_conversation(&id); }
                Op::Append { target, count, title, session } => {
                    let id = pick_id(&store, target);
                    let messages = (0..count).map(|n| Message::user(n.to_string())).collect();
                    store.append_messages(&id, messages, AppendOptions { new_title: title, new_session_id: session });
                }
            }

            if let Some(current) = store.current_id() {
                prop_assert!(store.get(current).is_some(), "dangling selection {current}");
            }
            let ids: HashSet<&str> = store.conversations().iter().map(|c| c.id.as_str()).collect();
            prop_assert_eq!(ids.len(), store.conversations().len(), "duplicate conversation ids");
        }
    }

    #[test]
    fn prop_append_grows_by_exactly_n_and_keeps_prefix(
        batches in proptest::collection::vec(1usize..5, 1..10)
    ) {
        let mut store = new_store();
        let id = store.create_conversation();

        for (round, n) in batches.into_iter().enumerate() {
            let before = store.get(&id).unwrap().messages.clone();
            let messages: Vec<Message> = (0..n).map(|k| Message::ai(format!("{round}-{k}"))).collect();
            store.append_messages(&id, messages.clone(), AppendOptions::default());

            let after = &store.get(&id).unwrap().messages;
            prop_assert_eq!(after.len(), before.len() + n);
            prop_assert_eq!(&after[..before.len()], before.as_slice());
            prop_assert_eq!(&after[before.len()..], messages.as_slice());
        }
    }

    #[test]
    fn prop_title_and_session_change_at_most_once(
        ops in proptest::collection::vec(
            (proptest::option::of("[a-z]{1,8}"), proptest::option::of("s[0-9]{1,3}")),
            1..20,
        )
    ) {
        let mut store = new_store();
        let id = store.create_conversation();
        let mut first_title: Option<String> = None;
        let mut first_session: Option<String> = None;
        let mut seen_messages = false;

        for (title, session) in ops {
            if !seen_messages {
                first_title.clone_from(&title);
            }
            if first_session.is_none() {
                first_session.clone_from(&session);
            }
            store.append_messages(
                &id,
                vec![Message::user("x")],
                AppendOptions { new_title: title, new_session_id: session },
            );
            seen_messages = true;

            let conv = store.get(&id).unwrap();
            let expected_title = first_title.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string());
            prop_assert_eq!(&conv.title, &expected_title);
            prop_assert_eq!(&conv.session_id, &first_session);
        }
    }

    #[test]
    fn prop_deleting_non_current_keeps_selection(
        creates in 2usize..6,
        victim in 0usize..6,
    ) {
        let mut store = new_store();
        for _ in 0..creates {
            store.create_conversation();
        }
        let current = store.current_id().map(String::from);
        let victim_id = pick_id(&store, victim);
        prop_assume!(current.as_deref() != Some(victim_id.as_str()));

        store.delete_conversation(&victim_id);
        prop_assert_eq!(store.current_id().map(String::from), current);
    }
}
