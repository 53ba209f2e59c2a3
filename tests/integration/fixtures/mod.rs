// Screenplay, annotator and fan-fiction fixtures with known outputs
// WHY: Golden-file testing requires deterministic input/output pairs for validation

#![allow(dead_code)]

/// Four plain speeches separated by blank lines and one action paragraph
pub const FOUR_SPEECHES: &str = concat!(
    "                           WILL GRAHAM\n",
    "                 I feel like I\u{2019}m dreaming.\n",
    "\n",
    "                           JACK CRAWFORD\n",
    "                 The head was reported stolen last\n",
    "                 night about a mile from here.\n",
    "\n",
    "                           WILL GRAHAM\n",
    "                 Just the head?\n",
    "                 I also say this.\n",
    "                 And this!!\n",
    "\n",
    "     Brian Zeller, Beverly Katz, and Jimmy Price are combing the\n",
    "     immediate area for forensic evidence. Jack and Will stare as\n",
    "     Beverly and Brian Zeller attempt to shoo the crows away.\n",
    "\n",
    "                           JACK CRAWFORD\n",
    "                 Minneapolis homicide has already\n",
    "                 made a statement. They\u{2019}re calling\n",
    "                 him the \u{201C}Minnesota Shrike.\u{201D}\n",
    "\n",
    "\n",
);

pub const FOUR_SPEECHES_EXPECTED: [(&str, &str); 4] = [
    ("WILL GRAHAM", "I feel like I\u{2019}m dreaming."),
    (
        "JACK CRAWFORD",
        "The head was reported stolen last night about a mile from here.",
    ),
    ("WILL GRAHAM", "Just the head? I also say this. And this!!"),
    (
        "JACK CRAWFORD",
        "Minneapolis homicide has already made a statement. They\u{2019}re calling him the \u{201C}Minnesota Shrike.\u{201D}",
    ),
];

/// Stage direction inside a speech and a page break with a running header
pub const STAGE_DIRECTION_AND_PAGE_BREAK: &str = concat!(
    "     A CHYRON tells us we are --\n",
    "\n",
    "     BLOOMINGTON, MINNESOTA\n",
    "\n",
    "                         ABIGAIL\n",
    "               Hello? Just a second.\n",
    "                   (to her father)\n",
    "               Dad. It\u{2019}s for you.\n",
    "\x0c      HANNIBAL - PROD. #101 - DBL GREEN Collated   6/26/13         43.\n",
    "\n",
    "\n",
    "                            JACOB\n",
    "               Who is it?\n",
    "\n",
    "                         ABIGAIL\n",
    "               Caller i.d. said it was work.\n",
    "\n",
    "     She hands Jacob the phone and he presses it to his ear.\n",
    "\n",
    "\n",
);

pub const STAGE_DIRECTION_EXPECTED: [(&str, &str); 3] = [
    ("ABIGAIL", "Hello? Just a second. Dad. It\u{2019}s for you."),
    ("JACOB", "Who is it?"),
    ("ABIGAIL", "Caller i.d. said it was work."),
];

/// Speech resumed twice with continuation cues across action lines
pub const CONTINUED_SPEECH: &str = concat!(
    "                            JACK CRAWFORD\n",
    "                  What are you doing in here?\n",
    "\n",
    "                            WILL GRAHAM\n",
    "                  I enjoy the smell of urinal cake.\n",
    "\n",
    "                             JACK CRAWFORD\n",
    "                  Me, too.   Lets talk.\n",
    "\n",
    "     An AGENT ENTERS to use the facilities.     Jack holds the door.\n",
    "\n",
    "                            JACK CRAWFORD (CONT\u{2019}D)\n",
    "                  Use the ladies room.\n",
    "\n",
    "     The Agent abruptly turns and EXITS. Will eyes Jack closing\n",
    "     the door, realizing he\u{2019}s not getting by without conversation.\n",
    "\n",
    "                            JACK CRAWFORD (CONT\u{2019}D)\n",
    "                  Do you respect my judgement, Will?\n",
    "\n",
    "                             WILL GRAHAM\n",
    "                  Yes.\n",
    "\n",
    "\n",
);

pub const CONTINUED_SPEECH_EXPECTED: [(&str, &str); 4] = [
    ("JACK CRAWFORD", "What are you doing in here?"),
    ("WILL GRAHAM", "I enjoy the smell of urinal cake."),
    (
        "JACK CRAWFORD",
        "Me, too.   Lets talk. Use the ladies room. Do you respect my judgement, Will?",
    ),
    ("WILL GRAHAM", "Yes."),
];

/// Two numbered scenes; the second is interrupted by a running header
pub const NUMBERED_EPISODE: &str = concat!(
    "      HANNIBAL - PROD. #101 - WHITE Draft   6/26/13         1.\n",
    "     TEASER\n",
    "\n",
    "     1    INT. CLASSROOM - DAY                                1\n",
    "\n",
    "                           WILL GRAHAM\n",
    "                 Good morning.\n",
    "\n",
    "                           JACK CRAWFORD\n",
    "                 Got a minute?\n",
    "\n",
    "     2    EXT. FIELD - NIGHT                                  2\n",
    "\n",
    "                           DR. LECTER\n",
    "                 Hello, Will.\n",
    "\n",
    "\x0c      HANNIBAL - PROD. #101 - WHITE Draft   6/26/13         2.\n",
    "                           WILL GRAHAM\n",
    "                 Hello.\n",
    "\n",
    "                           HANNIBAL (CONT'D)\n",
    "                 Shall we?\n",
    "\n",
);

/// Character bins used across the integration tests, in priority order
pub const CHARACTER_BINS: &str = r#"{
    "Hannibal": ["hannibal lecter", "dr. lecter", "lecter"],
    "Will Graham": ["will", "will graham"],
    "Jack Crawford": ["jack", "jack crawford", "crawford"]
}"#;

/// Annotator book with one unnamed character
pub const BOOK: &str = r#"{
    "characters": [
        {"id": 0, "names": [{"n": "Lecter", "c": 40}],
         "speaking": [{"w": "Good morning, Clarice.", "i": 120}, {"w": "Quid pro quo.", "i": 15}]},
        {"id": 1, "names": [], "speaking": [{"w": "Nobody.", "i": 50}]},
        {"id": 2, "names": [{"n": "Starling", "c": 30}],
         "speaking": [{"w": "Dr. Lecter.", "i": 60}]},
        {"id": 3, "names": [{"n": "Crawford", "c": 9}], "speaking": []}
    ]
}"#;

/// Token table for `BOOK`: mentions 0, 2, 0, 3 with non-character tokens between
pub const TOKENS: &str = "token\tcharacterId\nLecter\t0\nsmiled\tO\nat\tO\nStarling\t2\n.\tO\nHe\t0\nwrote\tO\nto\tO\nCrawford\t3\n";

/// Scraped fan-fiction corpus: one crossover, one podfic, five prose works
pub fn stories_json() -> String {
    let mut stories = vec![
        r#"{"id": "crossover", "fandoms": ["Hannibal Lecter Series", "Hannibal (TV)"], "additional_tags": [], "characters": ["Hannibal Lecter", "Clarice Starling"], "words": 300, "chapters": [{"text": "x"}]}"#.to_string(),
        r#"{"id": "audio", "fandoms": ["Hannibal (TV)"], "additional_tags": ["Podfic"], "characters": ["Will Graham"], "words": 300, "chapters": []}"#.to_string(),
    ];
    for (i, words) in [100, 200, 300, 400, 500].iter().enumerate() {
        stories.push(format!(
            r#"{{"id": "s{i}", "fandoms": ["Hannibal (TV)"], "additional_tags": ["Angst"], "characters": ["Hannibal Lecter", "Will Graham", "Jack Crawford"], "words": {words}, "chapters": [{{"text": "Chapter one."}}, {{"text": "Chapter two."}}]}}"#
        ));
    }
    format!("[{}]", stories.join(",\n"))
}
