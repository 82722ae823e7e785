//! Whole-input properties of the annotator.
//!
//! These run the segmenter over the bundled stories and a handful of
//! hand-picked mixed-script strings with a small HSK-style table, and check
//! the invariants every renderer relies on:
//! - span text concatenates back to the input
//! - non-Chinese characters are single passthrough spans
//! - unknown characters are exactly the `?` spans
//! - repeated runs agree

use reader_core::utils::is_chinese_char;
use reader_core::{sample_stories, segment, SpanSource, VocabEntry, Vocabulary};

fn known_table() -> Vocabulary {
    Vocabulary::from_csv_str(
        "我,wǒ,I\n你,nǐ,you\n好,hǎo,good\n你好,nǐ hǎo,hello\n今天,jīntiān,today\n\
         是,shì,to be\n星期,xīngqī,week\n一,yī,one\n很,hěn,very\n喜欢,xǐhuan,to like\n\
         看,kàn,to look\n书,shū,book\n妈妈,māma,mom\n爸爸,bàba,dad\n商店,shāngdiàn,shop\n\
         学校,xuéxiào,school\n中国,Zhōngguó,China\n吃饭,chīfàn,to eat\n",
    )
    .unwrap()
}

fn extra_table() -> Vocabulary {
    Vocabulary::from_csv_str(
        "星期一,xīngqīyī,Monday\n起床,qǐchuáng,to get up\n出租车,chūzūchē,taxi\n\
         可爱,kě'ài,cute\n好,hǎo,\"good, fine\"\n里面,lǐmiàn,inside\n",
    )
    .unwrap()
}

fn inputs() -> Vec<String> {
    let mut texts: Vec<String> = sample_stories().into_iter().map(|s| s.content).collect();
    texts.extend(
        [
            "",
            "Hi你好",
            "ABC 123, 你好!\n\n再见。",
            "猫狗鱼",
            "今天是星期一。Today is Monday.",
            "\u{4DFF}\u{4E00}\u{9FFF}\u{A000}",
            "😀你好😀",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    texts
}

#[test]
fn spans_reconstruct_input() {
    let (known, extra) = (known_table(), extra_table());
    for text in inputs() {
        let seg = segment(&text, &known, &extra);
        let joined: String = seg.spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, text);
        let total: usize = seg.spans.iter().map(|s| s.char_len()).sum();
        assert_eq!(total, text.chars().count());
        assert!(seg.spans.len() <= text.chars().count());
    }
}

#[test]
fn passthrough_is_one_char_known_and_bare() {
    let (known, extra) = (known_table(), extra_table());
    for text in inputs() {
        let seg = segment(&text, &known, &extra);
        for span in &seg.spans {
            let first = span.text.chars().next().unwrap();
            if is_chinese_char(first) {
                assert!(!span.is_passthrough());
                assert!(span.text.chars().all(is_chinese_char), "mixed span {:?}", span.text);
            } else {
                assert!(span.is_passthrough());
                assert_eq!(span.char_len(), 1);
                assert!(span.is_known());
                assert!(span.pronunciation.is_empty());
                assert!(span.gloss.is_empty());
            }
        }
    }
}

#[test]
fn unknown_set_matches_placeholder_spans() {
    let (known, extra) = (known_table(), extra_table());
    for text in inputs() {
        let seg = segment(&text, &known, &extra);
        for span in &seg.spans {
            let ch = span.text.chars().next().unwrap();
            if span.source == SpanSource::Unmatched {
                assert_eq!(span.char_len(), 1);
                assert_eq!(span.pronunciation, "?");
                assert_eq!(span.gloss, "?");
                assert!(seg.unknown.contains(ch));
            }
        }
        for ch in seg.unknown.iter() {
            assert!(!known.contains(&ch.to_string()));
            assert!(!extra.contains(&ch.to_string()));
        }
    }
}

#[test]
fn longest_match_across_tables() {
    let (known, extra) = (known_table(), extra_table());
    let seg = segment("今天是星期一。", &known, &extra);
    let texts: Vec<_> = seg.spans.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["今天", "是", "星期一", "。"]);
    assert_eq!(seg.spans[2].source, SpanSource::Extra);
    assert_eq!(seg.spans[2].gloss, "Monday");
}

#[test]
fn known_single_char_beats_extra_single_char() {
    let (known, extra) = (known_table(), extra_table());
    let seg = segment("好", &known, &extra);
    assert_eq!(seg.spans[0].source, SpanSource::Known);
    assert_eq!(seg.spans[0].gloss, "good");
}

#[test]
fn repeated_runs_agree() {
    let (known, extra) = (known_table(), extra_table());
    for text in inputs() {
        let a = segment(&text, &known, &extra);
        let b = segment(&text, &known, &extra);
        assert_eq!(a, b);
    }
}

#[test]
fn tables_are_shareable_across_threads() {
    let known = std::sync::Arc::new(known_table());
    let extra = std::sync::Arc::new(extra_table());
    let handles: Vec<_> = sample_stories()
        .into_iter()
        .map(|story| {
            let known = known.clone();
            let extra = extra.clone();
            std::thread::spawn(move || segment(&story.content, &known, &extra))
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let stories = sample_stories();
    for (story, seg) in stories.iter().zip(&results) {
        assert_eq!(seg, &segment(&story.content, &known, &extra));
    }
}

#[test]
fn empty_tables_mark_every_ideograph_unknown() {
    let empty = Vocabulary::new();
    let seg = segment("我爱我家", &empty, &empty);
    assert_eq!(seg.spans.len(), 4);
    assert!(seg.spans.iter().all(|s| s.source == SpanSource::Unmatched));
    assert_eq!(seg.unknown.to_string(), "家我爱");
    let mut entry_table = Vocabulary::new();
    entry_table.insert("我", VocabEntry::new("wǒ", "I"));
    let seg = segment("我爱我家", &entry_table, &empty);
    assert!(!seg.unknown.contains('我'));
}
