//! The instruction sent alongside every label image.
//!
//! Category and type choices are generated from the taxonomy so the two
//! can never drift apart. A few extra types are offered to the model on top
//! of the taxonomy; records carrying them are still accepted because stored
//! types are not checked against their category.

use sakenote_core::record::ANALYSIS_KEYS;
use sakenote_core::taxonomy::{Category, CATEGORIES};

const INTRO: &str = "画像に写っているお酒について詳しく教えてください。JSONで詳細情報を抽出してください。";

const DESCRIPTION_FORMAT: &str = "\
4. \"description\"（特徴）は以下のフォーマットで出力すること。各項目の見出しを【 】で囲み、改行で区切ること。

   【特徴】
   （製品の概要、産地の特徴など）

   【外観】
   （色調、濃淡、粘性など）

   【香り】
   （果実、花、スパイス、樽香などのアロマ）

   【味わい】
   （アタック、酸味、甘み、苦味、渋み、ボディ感、余韻）

   【ペアリング】
   （具体的な料理名や食材）

   【熟成】
   （熟成方法、規定、ポテンシャルに関する事実ベースの記述。 Riservaなど等級の解説も含めて具体的に）";

const FIELD_RULES: &str = "\
5. \"price_estimate\": 日本国内での現在の一般的な小売価格帯を記入すること。不明な場合は空白。

6. \"country\": 生産国を記入すること。不明な場合は空白。

7. \"region\": 生産地域（都道府県、州など）を記入すること。不明な場合は空白。

8. \"producer\": 生産者を記入すること。不明な場合は空白。

9. \"grape\": 品種を記入すること。複数ある場合はコンマで区切る。不明な場合は空白。";

/// Types offered in the prompt but absent from the taxonomy's filter list.
/// Each is inserted just before the category's trailing catch-all type.
const PROMPT_EXTRA_TYPES: &[(Category, &str)] = &[(Category::Other, "リキュール")];

fn prompt_types(category: Category) -> Vec<&'static str> {
    let mut types = category.types().to_vec();
    for (_, extra) in PROMPT_EXTRA_TYPES.iter().filter(|(c, _)| *c == category) {
        let at = types.len().saturating_sub(1);
        types.insert(at, *extra);
    }
    types
}

fn quoted(items: &[&str]) -> String {
    items
        .iter()
        .map(|s| format!("\"{s}\""))
        .collect::<Vec<_>>()
        .join(",")
}

/// Build the label analysis instruction.
pub fn label_prompt() -> String {
    let keys: Vec<&str> = CATEGORIES.iter().map(|c| c.key()).collect();
    let type_lines: Vec<String> = CATEGORIES
        .iter()
        .map(|c| format!("   - {}：{}", c.key(), quoted(&prompt_types(*c))))
        .collect();

    format!(
        "{INTRO}\n\
         【最重要ルール】\n\
         1. カテゴリ、タイプは以下（2,3）の中から選ぶこと。\n\
         2. \"category\"：{categories}\n\
         3. \"type\" はカテゴリごとに以下の中から選ぶこと。\n\
         {types}\n\n\
         {DESCRIPTION_FORMAT}\n\n\
         {FIELD_RULES}\n\n\
         抽出キー: {keys}\n\
         JSONのみ返却。不明な項目は空文字(\"\")にすること。",
        categories = quoted(&keys),
        types = type_lines.join("\n"),
        keys = ANALYSIS_KEYS.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_category_and_type() {
        let prompt = label_prompt();
        for c in CATEGORIES {
            assert!(prompt.contains(&format!("\"{}\"", c.key())));
            for t in c.types() {
                assert!(prompt.contains(&format!("\"{t}\"")), "missing type {t}");
            }
        }
    }

    #[test]
    fn offers_liqueur_under_other() {
        let prompt = label_prompt();
        assert!(prompt.contains(
            "   - その他：\"ウイスキー\",\"果実酒\",\"リキュール\",\"その他\""
        ));
        assert_eq!(
            prompt_types(Category::Sake),
            Category::Sake.types().to_vec()
        );
    }

    #[test]
    fn names_the_extraction_keys() {
        let prompt = label_prompt();
        assert!(prompt.contains(
            "抽出キー: category, name, type, country, region, grape, producer, vintage, description, price_estimate"
        ));
        assert!(prompt.ends_with("JSONのみ返却。不明な項目は空文字(\"\")にすること。"));
    }

    #[test]
    fn includes_description_sections() {
        let prompt = label_prompt();
        for heading in ["【特徴】", "【外観】", "【香り】", "【味わい】", "【ペアリング】", "【熟成】"] {
            assert!(prompt.contains(heading));
        }
        assert!(prompt.contains("Riservaなど等級の解説も含めて具体的に"));
    }
}
