//! Pattern classes matched against recognized text.
//!
//! Classes are listed in the order their matches are appended to the evidence spans.

use std::sync::LazyLock;

use regex::Regex;

use super::normalize::PreparedText;

const GAMBLING: &str = r"(?i)(博彩|赌博|赌场|百家乐|彩票|下注|押注|菠菜|老虎机|棋牌|返水|充值送|\bcasino\b|\bbetting\b|\bbaccarat\b|\bpoker\b)";

const CONTACT_HINT: &str = r"(?i)(加\s*[v微扣q]|微信|wechat|weixin|\bvx\b|v信|威信|薇信|扣扣|qq群|联系方式|扫码|二维码|whatsapp|telegram|\btg\b)";

const QQ_ID: &str = r"(?i)(?:qq|扣扣|企鹅)\s*号?\s*[:：]?\s*[1-9][0-9]{4,11}";

/// Digit boundaries are checked in [`collect_phones`] so adjacent numbers are not consumed.
const PHONE_STRICT: &str = r"(?:\+?86[-\s]?)?1[3-9][0-9]{9}";

const LONG_DIGITS: &str = r"[0-9](?:[\s\-.]?[0-9]){7,}";

const SEXUAL: &str = r"(?i)(裸聊|约炮|色情|黄片|成人视频|一夜情|援交|上门服务|特殊服务|特殊按摩|\bporn\b|\bnude\b|\bnsfw\b|\bsex\b)";

const AD_TERMS: &str = r"(私聊|私信|加我|代购|引流|兼职|刷单|优惠券|进群|主页联系|看主页)";

const WHITELIST: &str = r"(欢迎来到(?:我的)?直播间|感谢(?:大家的?)?关注|谢谢(?:大家的?)?关注|感谢.{0,4}礼物|谢谢.{0,4}礼物|点点关注|点赞关注|欢迎新朋友|晚安)";

/// Which pattern classes fired, with the matched substrings in class order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternHits {
    pub gambling: bool,
    pub contact_hint: bool,
    pub qq_id: bool,
    pub phone: bool,
    pub long_digits: bool,
    pub sexual: bool,
    pub ad_term: bool,
    pub whitelisted: bool,
    pub matches: Vec<String>,
}

impl PatternHits {
    /// Contact solicitation in any form: explicit hints or advertising phrasing.
    pub fn solicits_contact(&self) -> bool {
        self.contact_hint || self.ad_term
    }

    /// A concrete contact identifier (phone number or QQ-style id).
    pub fn has_contact_id(&self) -> bool {
        self.phone || self.qq_id
    }
}

static PATTERNS: LazyLock<PatternSet> = LazyLock::new(PatternSet::build);

/// Compiled pattern classes.
#[derive(Debug)]
pub struct PatternSet {
    gambling: Regex,
    contact_hint: Regex,
    qq_id: Regex,
    phone: Regex,
    long_digits: Regex,
    sexual: Regex,
    ad_terms: Regex,
    whitelist: Regex,
}

impl PatternSet {
    /// Process-wide set, compiled on first use.
    pub fn shared() -> &'static PatternSet {
        &PATTERNS
    }

    fn build() -> Self {
        Self {
            gambling: compile(GAMBLING),
            contact_hint: compile(CONTACT_HINT),
            qq_id: compile(QQ_ID),
            phone: compile(PHONE_STRICT),
            long_digits: compile(LONG_DIGITS),
            sexual: compile(SEXUAL),
            ad_terms: compile(AD_TERMS),
            whitelist: compile(WHITELIST),
        }
    }

    pub fn scan(&self, text: &PreparedText) -> PatternHits {
        let mut hits = PatternHits::default();
        let raw = text.raw.as_str();
        let normalized = text.normalized.as_str();

        hits.gambling = collect(&self.gambling, raw, &mut hits.matches);
        hits.contact_hint = collect(&self.contact_hint, raw, &mut hits.matches);
        hits.qq_id = collect(&self.qq_id, normalized, &mut hits.matches);
        hits.phone = collect_phones(&self.phone, normalized, &mut hits.matches);
        hits.long_digits = collect(&self.long_digits, normalized, &mut hits.matches);
        hits.sexual = collect(&self.sexual, raw, &mut hits.matches);
        hits.ad_term = collect(&self.ad_terms, raw, &mut hits.matches);
        hits.whitelisted = self.whitelist.is_match(raw);

        hits
    }

    pub fn is_whitelisted(&self, raw: &str) -> bool {
        self.whitelist.is_match(raw)
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern must compile")
}

fn collect(re: &Regex, text: &str, out: &mut Vec<String>) -> bool {
    let before = out.len();
    out.extend(re.find_iter(text).map(|m| m.as_str().trim().to_string()));
    out.len() > before
}

/// Like [`collect`] but drops matches glued to further digits on either side.
fn collect_phones(re: &Regex, text: &str, out: &mut Vec<String>) -> bool {
    let before = out.len();
    out.extend(
        re.find_iter(text)
            .filter(|m| {
                let glued_before = text[..m.start()]
                    .chars()
                    .next_back()
                    .is_some_and(|c| c.is_ascii_digit());
                let glued_after = text[m.end()..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_digit());
                !glued_before && !glued_after
            })
            .map(|m| m.as_str().trim().to_string()),
    );
    out.len() > before
}
