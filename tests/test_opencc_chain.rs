use opencc_chain::{Converter, InitError, ProfileLoader, PROFILE_IDS};

const DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn open(id: &str) -> Converter {
        ProfileLoader::new()
            .with_search_path(DATA_DIR)
            .open(id)
            .unwrap_or_else(|e| panic!("failed to open {id}: {e}"))
    }

    #[test]
    fn every_builtin_profile_opens() {
        for id in PROFILE_IDS {
            let converter = open(id);
            assert!(!converter.chain().stages().is_empty(), "{id}");
            assert!(!converter.name().is_empty(), "{id}");
        }
    }

    #[test]
    fn s2t_test() {
        let input = "你好，世界！龙马精神！\t\n";
        let expected_output = "你好，世界！龍馬精神！\t\n";
        assert_eq!(open("s2t").convert(input), expected_output);
    }

    #[test]
    fn s2t_extended_test() {
        let input = "俨骖𬴂于上路，访风景于崇阿";
        let expected_output = "儼驂騑於上路，訪風景於崇阿";
        assert_eq!(open("s2t").convert(input), expected_output);
    }

    #[test]
    fn s2t_phrases_beat_characters() {
        let s2t = open("s2t");
        assert_eq!(s2t.convert("头发"), "頭髮");
        assert_eq!(s2t.convert("理发店"), "理髮店");
        assert_eq!(s2t.convert("一发千钧"), "一髮千鈞");
        assert_eq!(s2t.convert("干燥以后"), "乾燥以後");
        assert_eq!(s2t.convert("网络鼠标键盘"), "網絡鼠標鍵盤");
    }

    #[test]
    fn s2tw_test() {
        let s2tw = open("s2tw");
        assert_eq!(s2tw.convert("你好，意大利！"), "你好，意大利！");
        assert_eq!(s2tw.convert("为什么"), "為什麼");
        assert_eq!(open("s2t").convert("为什么"), "爲什麼");
    }

    #[test]
    fn tw2s_test() {
        assert_eq!(open("tw2s").convert("為什麼"), "为什么");
    }

    #[test]
    fn s2twp_test() {
        let s2twp = open("s2twp");
        assert_eq!(s2twp.convert("网络鼠标键盘"), "網路滑鼠鍵盤");
        assert_eq!(s2twp.convert("你好，意大利！"), "你好，義大利！");
    }

    #[test]
    fn tw2sp_test() {
        assert_eq!(open("tw2sp").convert("你好，義大利！"), "你好，意大利！");
        assert_eq!(open("tw2sp").convert("網路滑鼠"), "网络鼠标");
    }

    #[test]
    fn t2s_test() {
        let t2s = open("t2s");
        assert_eq!(t2s.convert("頭髮乾燥"), "头发干燥");
        assert_eq!(t2s.convert("儼驂騑於上路"), "俨骖𬴂于上路");
        assert_eq!(t2s.convert("著名"), "著名");
    }

    #[test]
    fn hk_round_trip() {
        assert_eq!(open("s2hk").convert("说明"), "説明");
        assert_eq!(open("hk2s").convert("説明"), "说明");
        assert_eq!(open("t2hk").convert("說明"), "説明");
        assert_eq!(open("hk2t").convert("嘴唇"), "嘴脣");
    }

    #[test]
    fn tw_variants_test() {
        assert_eq!(open("t2tw").convert("裏面"), "裡面");
        assert_eq!(open("tw2t").convert("裡面"), "裏面");
        // Phrase entry keeps 著 from becoming 着.
        assert_eq!(open("tw2t").convert("著名"), "著名");
        assert_eq!(open("tw2t").convert("著"), "着");
    }

    #[test]
    fn jp_test() {
        assert_eq!(
            open("t2jp").convert("舊字體：廣國，讀賣。"),
            "旧字体：広国，読売。"
        );
        assert_eq!(open("jp2t").convert("広国，読売。"), "廣國，讀賣。");
        assert_eq!(open("jp2t").convert("一獲千金"), "一攫千金");
    }

    #[test]
    fn converted_text_is_stable_in_same_direction() {
        let s2t = open("s2t");
        for input in ["头发干燥以后", "龙马精神", "plain ascii", "计算机里面"] {
            let once = s2t.convert(input);
            assert_eq!(s2t.convert(&once), once, "{input}");
        }
    }

    #[test]
    fn unrelated_text_passes_through() {
        let input = "Hello, world! 1234 ✓ こんにちは";
        for id in ["s2t", "t2s", "s2twp", "tw2sp"] {
            assert_eq!(open(id).convert(input), input, "{id}");
        }
        assert_eq!(open("s2t").convert(""), "");
    }

    #[test]
    fn missing_profile_reports_path() {
        let path = "/no/such/dir/missing_profile.json";
        let err = ProfileLoader::new().open(path).unwrap_err();
        assert!(matches!(err, InitError::NotFound { .. }));
        let message = err.to_string();
        assert!(message.contains(path));
        assert!(message.contains("not found"));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = open("s2t").convert_bytes(&[0xFF, 0xFE, 0xFD]).unwrap_err();
        assert!(err.to_string().starts_with("invalid UTF-8"));
        assert_eq!(
            open("s2t").convert_bytes("龙马".as_bytes()).unwrap(),
            "龍馬"
        );
    }

    #[test]
    fn default_open_uses_bundled_data() {
        let converter = Converter::open("s2t").unwrap();
        assert_eq!(converter.convert("龙马"), "龍馬");
        converter.close();
    }

    #[test]
    fn batch_preserves_order() {
        let s2t = open("s2t");
        let inputs = vec!["龙", "马", "头发", "abc", ""];
        let outputs = s2t.convert_batch(&inputs);
        assert_eq!(outputs, vec!["龍", "馬", "頭髮", "abc", ""]);
    }

    #[test]
    fn converter_is_shared_across_threads() {
        let s2twp = Arc::new(open("s2twp"));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = Arc::clone(&s2twp);
                thread::spawn(move || c.convert("网络鼠标键盘"))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), "網路滑鼠鍵盤");
        }
    }
}
