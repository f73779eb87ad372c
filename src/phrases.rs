//! Display text for the celebration page.
//!
//! The page speaks Arabic and addresses the recipient directly, so most
//! phrases come in a masculine and a feminine form picked by [`Variant`].

use crate::celebration::{Recipient, RecipientError, Variant, Wish};
use crate::core::AcquireError;

#[inline]
fn pick(variant: Variant, male: &'static str, female: &'static str) -> &'static str {
    match variant {
        Variant::Male => male,
        Variant::Female => female,
    }
}

/// A toast: short title plus a description line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

impl Notice {
    fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

pub fn blow_prompt(r: &Recipient) -> String {
    let verb = pick(r.variant(), "انفخ", "انفخي");
    format!("{} في الشموع يا {} 🎂", verb, r.name())
}

pub fn happy_birthday(r: &Recipient) -> String {
    format!("عيد ميلاد سعيد يا {} 🎉", r.name())
}

pub fn extinguished_notice(r: &Recipient) -> Notice {
    let wish = pick(r.variant(), "تمنى أمنية خاصة يا", "تمني أمنية خاصة يا");
    Notice::new("🎉 عيد ميلاد سعيد! 🎉", format!("{} {}", wish, r.name()))
}

pub fn relit_notice() -> Notice {
    Notice::new("تم إعادة إشعال الشموع", "حاول النفخ مرة أخرى!")
}

pub fn mic_enabled_notice(variant: Variant) -> Notice {
    let blow = pick(variant, "انفخ أو تحدث بصوت عالٍ", "انفخي أو تحدثي بصوت عالٍ");
    Notice::new("تم تفعيل الميكروفون", format!("{} لإطفاء الشموع!", blow))
}

/// Explain why the microphone is unavailable and point at the cake instead.
pub fn mic_fallback_notice(variant: Variant, reason: &AcquireError) -> Notice {
    let click = pick(
        variant,
        "يمكنك النقر على الكيكة لإطفائها",
        "يمكنكِ النقر على الكيكة لإطفائها",
    );
    let body = match reason {
        AcquireError::PermissionDenied => {
            format!("تم رفض إذن الميكروفون. {} بدلاً من ذلك.", click)
        }
        AcquireError::DeviceNotFound => {
            format!("لم يتم العثور على ميكروفون. {} بدلاً من ذلك.", click)
        }
        AcquireError::InsecureContext => format!(
            "يتطلب الوصول إلى الميكروفون اتصالاً آمناً (HTTPS). {} بدلاً من ذلك.",
            click
        ),
        AcquireError::Unsupported => {
            format!("المتصفح لا يدعم الميكروفون. {} بدلاً من ذلك.", click)
        }
        AcquireError::Other(_) => "يرجى السماح بالوصول للميكروفون لتجربة أفضل".to_string(),
    };
    Notice::new("لم نتمكن من الوصول للميكروفون", body)
}

pub fn mic_tooltip(variant: Variant, granted: bool) -> &'static str {
    if granted {
        pick(
            variant,
            "انفخ في الميكروفون لإطفاء الشموع",
            "انفخي في الميكروفون لإطفاء الشموع",
        )
    } else {
        pick(
            variant,
            "انقر لتفعيل الميكروفون أو إطفاء الشموع",
            "انقري لتفعيل الميكروفون أو إطفاء الشموع",
        )
    }
}

pub fn wish_placeholder(variant: Variant) -> &'static str {
    pick(variant, "اكتب أمنيتك هنا...", "اكتبي أمنيتك هنا...")
}

pub fn wish_submit_label(variant: Variant) -> &'static str {
    pick(variant, "ابعث الأمنية", "ابعثي الأمنية")
}

pub fn wish_sent_notice(wish: &Wish) -> Notice {
    Notice::new(
        "✨ تم إرسال أمنيتك ✨",
        format!("أمنيتك في طريقها للتحقق! \"{}\"", wish.preview()),
    )
}

pub fn share_message(r: &Recipient) -> String {
    format!("عيد ميلاد سعيد {}! 🎂🎉", r.name())
}

/// Rejected name on the create form.
pub fn create_error_notice(err: &RecipientError) -> Notice {
    let body = match err {
        RecipientError::Empty => "الرجاء إدخال اسم".to_string(),
        RecipientError::TooLong(_) => format!(
            "الاسم طويل جداً (الحد الأقصى {} حرفاً)",
            crate::constants::MAX_NAME_CHARS
        ),
    };
    Notice::new("خطأ", body)
}

pub fn created_notice(r: &Recipient) -> Notice {
    Notice::new("تم إنشاء الاحتفال", format!("تم إنشاء احتفال لـ {}", r.name()))
}

pub fn share_prompt(r: &Recipient) -> String {
    format!("شارك رابط الاحتفال مع {}", r.name())
}

pub fn copied_notice() -> Notice {
    Notice::new("تم نسخ الرابط", "يمكنك الآن مشاركته مع أصدقائك")
}

pub fn copy_failed_notice() -> Notice {
    Notice::new("فشل نسخ الرابط", "يرجى المحاولة مرة أخرى")
}

pub fn copy_label(copied: bool) -> &'static str {
    if copied {
        "تم النسخ"
    } else {
        "نسخ"
    }
}
