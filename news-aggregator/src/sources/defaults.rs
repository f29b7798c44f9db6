use super::SourceList;

pub const YAHOO_TOP_PICKS: (&str, &str) = ("Yahoo!ニュース", "https://news.yahoo.co.jp/rss/topics/top-picks.xml");
pub const ITMEDIA_TOP_STORY: (&str, &str) = ("ITメディア", "https://rss.itmedia.co.jp/rss/2.0/topstory.xml");
pub const YAHOO_BUSINESS: (&str, &str) = ("Yahoo!経済", "https://news.yahoo.co.jp/rss/topics/business.xml");

impl SourceList {
    /// Japanese general, tech and business headlines.
    pub fn defaults() -> Self {
        let mut list = Self::new();
        for (name, url) in [YAHOO_TOP_PICKS, ITMEDIA_TOP_STORY, YAHOO_BUSINESS] {
            list.insert(name, url);
        }
        list
    }
}
