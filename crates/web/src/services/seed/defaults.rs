//! The default dataset written into an empty store.

use crate::models::SettingsFields;

/// Login of the default admin.
pub const ADMIN_EMAIL: &str = "admin@restaurant.com";
/// Initial password of the default admin.
pub const ADMIN_PASSWORD: &str = "admin123";
/// Display name of the default admin.
pub const ADMIN_NAME: &str = "مدير المطعم";

/// A default dish: name, description, price.
pub type DefaultItem = (&'static str, &'static str, &'static str);

/// A default category and the items that belong to it.
#[derive(Debug, Clone, Copy)]
pub struct DefaultCategory {
    pub name: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    pub order: i32,
    pub items: &'static [DefaultItem],
}

/// Default restaurant settings.
#[must_use]
pub fn settings() -> SettingsFields {
    SettingsFields {
        restaurant_name: "مطعمنا المميز".to_owned(),
        logo_url: Some("/restaurant-logo.png".to_owned()),
        primary_color: "#f59e0b".to_owned(),
        secondary_color: "#ea580c".to_owned(),
        background_color: "#fffbeb".to_owned(),
        contact_phone: Some("1234-567-890".to_owned()),
        contact_email: Some("info@restaurant.com".to_owned()),
        address: Some("شارع الملك فهد، الرياض".to_owned()),
        working_hours: Some("من الساعة 11:00 صباحاً حتى 11:00 مساءً".to_owned()),
        welcome_text: Some(
            "مرحباً بك في مطعمنا! تصفح قائمتنا اللذيذة واختر من تشكيلتنا الواسعة من الأطباق \
             الشرقية الأصيلة التي تقدمها أيدي طهاة محترفين بخبرة طويلة"
                .to_owned(),
        ),
    }
}

/// Default categories in display order, six items each.
pub const CATEGORIES: [DefaultCategory; 5] = [
    DefaultCategory {
        name: "المقبلات",
        description: "مقبلات شهية لفتح الشهية",
        image: "/appetizers.jpg",
        order: 1,
        items: &[
            ("حمص بالطحينة", "حمص كلاسيكي مع زيت الزيتون والفلفل", "15 ريال"),
            ("متبل الباذنجان", "باذنجان مشوي مع الطماطم والبصل", "18 ريال"),
            ("ورق العنب", "ورق عنب محشي بالأرز والخضروات", "20 ريال"),
            ("الفتوش", "سلطة خضروات طازجة مع الخبز المحمص", "16 ريال"),
            ("تبولة", "سلطة البرغل مع البقدونس والنعناع", "14 ريال"),
            ("مخللات متنوعة", "تشكيلة من المخللات الشرقية", "12 ريال"),
        ],
    },
    DefaultCategory {
        name: "الأطباق الرئيسية",
        description: "أطباق رئيسية متنوعة ولذيذة",
        image: "/main-dishes.jpg",
        order: 2,
        items: &[
            ("منسف لحم", "أرز بسمتي مع اللحم المطهو على الطريقة الأردنية", "45 ريال"),
            ("مقلوبة دجاج", "أرز بالبازلاء والجزر مع الدجاج المشوي", "38 ريال"),
            ("ورق عنب باللحم", "ورق عنب محشي بالأرز واللحم المفروم", "42 ريال"),
            ("كبة باللبن", "كبة مقلية مع صلصة اللبن الثقيل", "35 ريال"),
            ("مسخن دجاج", "دجاج مع البصل والسماق والخبز العربي", "40 ريال"),
            ("برياني دجاج", "أرز بهارات هندية مع الدجاج", "36 ريال"),
        ],
    },
    DefaultCategory {
        name: "المشويات",
        description: "مشويات طازجة وشهية",
        image: "/grills.jpg",
        order: 3,
        items: &[
            ("شيش طاووق", "دجاج متبل مشوي مع الخضروات", "32 ريال"),
            ("كباب لحم", "لحم مفروم متبل مشوي على الفحم", "48 ريال"),
            ("شيش كباب", "قطع لحم مشوية مع الخضروات", "52 ريال"),
            ("فتة مشويات", "مشويات مع الخبز واللبن الثقيل", "44 ريال"),
            ("ريش غنم", "ريش غنم مشوي مع الأرز والسلطة", "55 ريال"),
            ("مشاوي مختلطة", "تشكيلة من المشويات المختلفة", "65 ريال"),
        ],
    },
    DefaultCategory {
        name: "الحلويات",
        description: "حلويات شرقية تقليدية",
        image: "/desserts.jpg",
        order: 4,
        items: &[
            ("كنافة بالجبن", "كنافة شرقية مع الجبن والقطر", "22 ريال"),
            ("بقلاوة", "بقلاوة بالمكسرات والقطر", "18 ريال"),
            ("أم علي", "حلوى بالخبز والحليب والمكسرات", "20 ريال"),
            ("رز بحليب", "أرز مطهو بالحليب ومزين بالقرفة", "16 ريال"),
            ("مهلبية", "مهلبية شرقية مع الفستق المطحون", "14 ريال"),
            ("قطايف بالجبن", "قطايف محشوة بالجبن ومقلية", "24 ريال"),
        ],
    },
    DefaultCategory {
        name: "المشروبات",
        description: "مشروبات منعشة وباردة",
        image: "/drinks.jpg",
        order: 5,
        items: &[
            ("عصير برتقال طازج", "عصير برتقال طازج معلق", "12 ريال"),
            ("عصير ليمون نعناع", "عصير ليمون منعش مع النعناع", "10 ريال"),
            ("قهوة عربية", "قهوة عربية أصيلة مع الهيل", "8 ريال"),
            ("شاي بالنعناع", "شاي أخضر مع النعناع الطازج", "6 ريال"),
            ("عصير فراولة", "عصير فراولة طازج ومثلج", "14 ريال"),
            ("ماء معدني", "ماء معدني بارد", "4 ريال"),
        ],
    },
];

/// Total number of default items.
#[must_use]
pub fn item_count() -> usize {
    CATEGORIES.iter().map(|c| c.items.len()).sum()
}
