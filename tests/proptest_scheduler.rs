use proptest::prelude::*;
use rephrase::pipeline::schedule::BatchScheduler;

mod common;
use common::records;

proptest! {
    #[test]
    fn batch_count_is_ceiling_and_only_last_is_short(
        n in 0usize..500,
        batch_size in 1usize..64
    ) {
        let corpus = records(n);
        let scheduler = BatchScheduler::new(batch_size).unwrap();
        let batches: Vec<_> = scheduler.batches(&corpus, 0).collect();

        prop_assert_eq!(batches.len(), n.div_ceil(batch_size));
        if let Some((last, rest)) = batches.split_last() {
            prop_assert!(rest.iter().all(|b| b.len() == batch_size));
            prop_assert!(last.len() >= 1 && last.len() <= batch_size);
        }

        let ids: Vec<&str> = batches
            .iter()
            .flat_map(|b| b.records.iter().map(|r| r.id.as_str()))
            .collect();
        let expected: Vec<&str> = corpus.iter().map(|r| r.id.as_str()).collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn resumed_batches_are_the_tail_of_a_full_pass(
        n in 0usize..300,
        batch_size in 1usize..32,
        resume in 0usize..40
    ) {
        let corpus = records(n);
        let scheduler = BatchScheduler::new(batch_size).unwrap();

        let full: Vec<_> = scheduler.batches(&corpus, 0).collect();
        let resumed: Vec<_> = scheduler.batches(&corpus, resume).collect();
        let tail: Vec<_> = full.iter().skip(resume).copied().collect();
        prop_assert_eq!(resumed, tail);
    }
}
